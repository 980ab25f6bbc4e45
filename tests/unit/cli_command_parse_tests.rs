use clap::Parser;

use llmrec::cli::commands::policy::PolicyCommand;
use llmrec::cli::{Cli, Commands};

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["llmrec"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

#[test]
fn parse_global_flags_after_subcommand() {
    let cli = parse(&["catalog", "--robot", "-vv"]);
    assert!(cli.robot);
    assert_eq!(cli.verbose, 2);
    assert!(matches!(cli.command, Commands::Catalog(_)));
}

#[test]
fn parse_train_overrides() {
    match parse(&["train", "--steps", "100", "--alpha", "0.5", "--seed", "3"]).command {
        Commands::Train(args) => {
            assert_eq!(args.steps, Some(100));
            assert_eq!(args.alpha, Some(0.5));
            assert_eq!(args.seed, Some(3));
            assert!(args.noise.is_none());
            assert!(args.out.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_feedback_with_negative_reward() {
    match parse(&["feedback", "--ctx", "{}", "--model", "m", "--reward", "-0.5"]).command {
        Commands::Feedback(args) => {
            assert_eq!(args.model, "m");
            assert_eq!(args.reward, -0.5);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_policy_subcommands() {
    match parse(&["policy", "export", "--out", "snap.json"]).command {
        Commands::Policy(args) => match args.command {
            PolicyCommand::Export(export) => {
                assert_eq!(export.out.as_deref(), Some(std::path::Path::new("snap.json")));
            }
            other => panic!("unexpected policy command: {other:?}"),
        },
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn recommend_requires_ctx() {
    assert!(Cli::try_parse_from(["llmrec", "recommend"]).is_err());
}
