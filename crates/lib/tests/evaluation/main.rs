mod common;
mod dag_tests;
mod expression_tests;
mod project_tests;
