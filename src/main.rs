use anyhow::Result;

fn main() -> Result<()> {
    let args = img_intake::cli::parse();
    img_intake::app::run(args)
}
