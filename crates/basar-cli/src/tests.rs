use super::*;

#[test]
fn parses_unify_with_repeated_inputs() {
    let cli = Cli::try_parse_from([
        "basar-cli", "unify", "--input", "victory.json", "-i", "rami_levy.json",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Unify {
            inputs,
            output,
            knowledge,
            compact,
        } => {
            assert_eq!(
                inputs,
                vec![PathBuf::from("victory.json"), PathBuf::from("rami_levy.json")]
            );
            assert!(output.is_none());
            assert!(knowledge.is_none());
            assert!(!compact);
        }
        Commands::Normalize { .. } => panic!("expected unify"),
    }
}

#[test]
fn parses_unify_output_and_flags() {
    let cli = Cli::try_parse_from([
        "basar-cli",
        "unify",
        "-i",
        "a.json",
        "--output",
        "catalog.json",
        "--knowledge",
        "config/knowledge.yaml",
        "--compact",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Unify {
            output: Some(ref o),
            knowledge: Some(ref k),
            compact: true,
            ..
        } if o == &PathBuf::from("catalog.json") && k == &PathBuf::from("config/knowledge.yaml")
    ));
}

#[test]
fn unify_requires_an_input() {
    assert!(Cli::try_parse_from(["basar-cli", "unify"]).is_err());
}

#[test]
fn parses_normalize_names() {
    let cli = Cli::try_parse_from(["basar-cli", "normalize", "חזה עוף", "כבש"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Normalize { ref names, knowledge: None } if names.len() == 2
    ));
}

#[test]
fn normalize_requires_a_name() {
    assert!(Cli::try_parse_from(["basar-cli", "normalize"]).is_err());
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["basar-cli"]).is_err());
}

#[test]
fn help_is_answered_by_the_parser_alone() {
    let err = Cli::try_parse_from(["basar-cli", "--help"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
}
