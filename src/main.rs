fn main() -> Result<(), Box<dyn std::error::Error>> {
    parlance::cli::main()
}
