//! FILENAME: app/dashboard/src/main.rs

fn main() -> anyhow::Result<()> {
    dashboard::run()
}
