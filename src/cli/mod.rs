use clap::Parser;

/// Command-line options for the analysis server
#[derive(Parser, Debug)]
#[command(
    name = "insight-server",
    about = "GraphQL service that transcribes and analyzes the audio track of online videos",
    version
)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1")]
    pub bind: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        std::env::remove_var("BIND_ADDR");
        std::env::remove_var("PORT");
        let cli = Cli::parse_from(["insight-server"]);
        assert_eq!(cli.bind, "127.0.0.1");
        assert_eq!(cli.port, 4000);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from(["insight-server", "--bind", "0.0.0.0", "-p", "8080", "-v"]);
        assert_eq!(cli.bind, "0.0.0.0");
        assert_eq!(cli.port, 8080);
        assert!(cli.verbose);
    }
}
