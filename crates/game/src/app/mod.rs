mod assets;
mod bootstrap;
mod cafe;
mod config;
mod flow;
mod loop_runner;
mod report;
mod ui;

pub(crate) use loop_runner::run;
