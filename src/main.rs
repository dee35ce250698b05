fn main() -> anyhow::Result<()> {
    anklewatch_lib::run()
}
