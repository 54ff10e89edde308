fn main() -> anyhow::Result<()> {
    stickydesk::cli::run()
}
