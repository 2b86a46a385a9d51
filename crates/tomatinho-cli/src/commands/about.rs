use tomatinho_core::APP_NAME;

pub const DESCRIPTION: &str = "Pomodoro timer for the terminal";
pub const AUTHOR: &str = "Mauricio Freitas";
pub const LICENSE: &str = "MIT";
pub const WEBSITE: &str = "https://github.com/meunomemauricio/tomatinho";

pub fn text() -> String {
    format!(
        "{APP_NAME} {version}\n{DESCRIPTION}\n\nAuthor:  {AUTHOR}\nLicense: {LICENSE}\nWebsite: {WEBSITE}",
        version = env!("CARGO_PKG_VERSION"),
    )
}

pub fn print() {
    println!("{}", text());
}
