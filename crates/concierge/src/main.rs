fn main() -> anyhow::Result<()> {
    concierge::cli::main()
}
