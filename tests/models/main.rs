mod experiment;
mod fitting;
mod helpers;
mod train_test;
