pub mod stats_parser;
