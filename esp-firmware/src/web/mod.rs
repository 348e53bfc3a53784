// Web-Oberfläche: Statische Dateien für den HTTP Server
//
// Beide Dateien werden zur Compile-Zeit ins Binary eingebettet.

pub const INDEX_HTML: &str = include_str!("index.html");
pub const APP_JS: &str = include_str!("app.js");
