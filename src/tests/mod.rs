mod utils;

mod cli_tests;
mod config_tests;
mod router_tests;
mod scraper_tests;
