use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Ask several large language models the same question at once.
#[derive(Debug, Parser)]
#[command(name = "boxai", version, about)]
pub struct Args {
    /// IP address and port to listen on. Overrides the configuration file.
    #[arg(short, long, env = "BOXAI_LISTEN_ADDRESS")]
    pub listen_address: Option<SocketAddr>,
    /// Path to the TOML configuration file. Built-in providers are used when omitted.
    #[arg(short, long, env = "BOXAI_CONFIG_PATH")]
    pub config: Option<PathBuf>,
    /// Log filter, e.g. `info` or `server=debug,llm=debug`.
    #[arg(long, env = "BOXAI_LOG", default_value = "info")]
    pub log: String,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn defaults() {
        temp_env::with_vars_unset(["BOXAI_LISTEN_ADDRESS", "BOXAI_CONFIG_PATH", "BOXAI_LOG"], || {
            let args = Args::parse_from(["boxai"]);

            assert_eq!(args.listen_address, None);
            assert_eq!(args.config, None);
            assert_eq!(args.log, "info");
        });
    }

    #[test]
    fn flags() {
        let args = Args::parse_from([
            "boxai",
            "--listen-address",
            "0.0.0.0:9000",
            "--config",
            "boxai.toml",
            "--log",
            "llm=debug",
        ]);

        assert_eq!(args.listen_address, Some("0.0.0.0:9000".parse().unwrap()));
        assert_eq!(args.config.unwrap().to_str(), Some("boxai.toml"));
        assert_eq!(args.log, "llm=debug");
    }

    #[test]
    fn environment() {
        temp_env::with_vars(
            [
                ("BOXAI_LISTEN_ADDRESS", Some("127.0.0.1:7000")),
                ("BOXAI_CONFIG_PATH", None),
                ("BOXAI_LOG", Some("warn")),
            ],
            || {
                let args = Args::parse_from(["boxai"]);

                assert_eq!(args.listen_address, Some("127.0.0.1:7000".parse().unwrap()));
                assert_eq!(args.log, "warn");
            },
        );
    }
}
