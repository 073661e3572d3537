use super::*;
use clap::Parser;

#[test]
fn test_parses_self_update() {
    let cli = Cli::try_parse_from(["primer", "self-update"]).unwrap();
    match cli.command {
        Commands::SelfUpdate(cmd) => {
            assert!(!cmd.force_update);
            assert!(!cmd.check);
        }
        Commands::New(_) => panic!("parsed the wrong command"),
    }
}

#[test]
fn test_selfupdate_alias() {
    let cli = Cli::try_parse_from(["primer", "selfupdate", "-f"]).unwrap();
    match cli.command {
        Commands::SelfUpdate(cmd) => assert!(cmd.force_update),
        Commands::New(_) => panic!("parsed the wrong command"),
    }
}

#[test]
fn test_force_update_long_flag() {
    let cli = Cli::try_parse_from(["primer", "self-update", "--force-update"]).unwrap();
    match cli.command {
        Commands::SelfUpdate(cmd) => assert!(cmd.force_update),
        Commands::New(_) => panic!("parsed the wrong command"),
    }
}

#[test]
fn test_check_flag() {
    let cli = Cli::try_parse_from(["primer", "self-update", "--check"]).unwrap();
    match cli.command {
        Commands::SelfUpdate(cmd) => assert!(cmd.check),
        Commands::New(_) => panic!("parsed the wrong command"),
    }
}

#[test]
fn test_new_requires_directory() {
    assert!(Cli::try_parse_from(["primer", "new"]).is_err());
}

#[test]
fn test_new_with_version_and_force() {
    let cli = Cli::try_parse_from(["primer", "new", "my-app", "--version", "1.2.0", "--force"])
        .unwrap();
    match cli.command {
        Commands::New(cmd) => {
            assert_eq!(cmd.directory, std::path::PathBuf::from("my-app"));
            assert_eq!(cmd.version.as_deref(), Some("1.2.0"));
            assert!(cmd.force);
        }
        Commands::SelfUpdate(_) => panic!("parsed the wrong command"),
    }
}

#[test]
fn test_verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["primer", "--verbose", "--quiet", "self-update"]).is_err());
}

#[test]
fn test_global_verbose_after_subcommand() {
    let cli = Cli::try_parse_from(["primer", "self-update", "--verbose"]).unwrap();
    assert!(cli.verbose);
}
