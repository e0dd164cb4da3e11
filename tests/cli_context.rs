use logroute::cli::{parse_context_pair, Cli, Commands};
use logroute::Context;

use clap::Parser;

#[test]
pub fn context_pairs_are_typed() {
    assert!(matches!(parse_context_pair("n=3").unwrap(), (k, Context::Int(3)) if k == "n"));
    assert!(matches!(parse_context_pair("r=0.5").unwrap().1, Context::Float(f) if f == 0.5));
    assert!(matches!(parse_context_pair("ok=true").unwrap().1, Context::Bool(true)));
    assert!(matches!(parse_context_pair("who=a=b").unwrap().1, Context::Str(s) if s == "a=b"));
}

#[test]
pub fn malformed_context_pairs_are_rejected() {
    assert!(parse_context_pair("novalue").is_err());
    assert!(parse_context_pair(" =1").is_err());
}

#[test]
pub fn emit_arguments_parse() {
    let cli = Cli::try_parse_from([
        "logroute", "emit", "-l", "warn", "-M", "db", "-m", "slow", "-c", "ms=120",
    ])
    .unwrap();
    match cli.command {
        Commands::Emit { level, module, message, context } => {
            assert_eq!(level, "warn");
            assert_eq!(module.as_deref(), Some("db"));
            assert_eq!(message, "slow");
            assert_eq!(context, vec!["ms=120".to_string()]);
        }
        Commands::ErrorDemo => panic!("expected emit"),
    }
}
