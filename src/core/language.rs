//! File extension to language lookup

use std::path::Path;

/// Known source extensions and the language identifier each maps to.
///
/// Language identifiers are the keys of `executor.yml`.
pub const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("c", "c"),
    ("cpp", "cpp"),
    ("cs", "csharp"),
    ("fs", "fsharp"),
    ("py", "python"),
    ("java", "java"),
    ("pas", "pascal"),
    ("m", "objective-c"),
    ("js", "javascript"),
    ("rb", "ruby"),
    ("go", "go"),
    ("php", "php"),
    ("sh", "shellscript"),
    ("ps1", "powershell"),
];

/// Map a bare extension (no dot) to its language identifier
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    EXTENSION_LANGUAGES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// Map a language identifier back to its canonical extension
pub fn extension_for_language(language: &str) -> Option<&'static str> {
    EXTENSION_LANGUAGES
        .iter()
        .find(|(_, lang)| *lang == language)
        .map(|(ext, _)| *ext)
}

/// Extension of a file name without the leading dot, or "" when it has none
pub fn file_extension(file_name: &str) -> &str {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

/// Language of a file name, resolved through its extension
pub fn language_for_file(file_name: &str) -> Option<&'static str> {
    language_for_extension(file_extension(file_name))
}
