fn main() {
    bqfmt_cli::lib_main();
}
