mod cli_command_parse_tests;
mod config_tests;
mod recommender_flow_tests;
