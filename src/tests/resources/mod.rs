mod client_tests;
mod dashboard_tests;
mod scheduler_tests;
