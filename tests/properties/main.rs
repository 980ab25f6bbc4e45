mod encoder_tests;
mod policy_tests;
