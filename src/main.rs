fn main() {
    frdtest::cli::run();
}
