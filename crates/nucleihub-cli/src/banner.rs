pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const BANNER: &str = r"
                        __       _  __            __  
   ____   __  __ _____ / /___   (_)/ /_   __  __ / /_ 
  / __ \ / / / // ___// // _ \ / // __ \ / / / // __ \
 / / / // /_/ // /__ / //  __// // / / // /_/ // /_/ /
/_/ /_/ \__,_/ \___//_/ \___//_//_/ /_/ \__,_//_.___/
";

pub fn version_line() -> String {
    format!("Current nucleihub version v{VERSION}")
}

/// Print the banner and version to stderr.
pub fn print() {
    eprintln!("{BANNER}\n{:>60}\n", version_line());
}
