use makegen::{parse_args, run, Invocation, USAGE};

fn main() -> anyhow::Result<()> {
    match parse_args(std::env::args_os().skip(1).collect())? {
        Invocation::Help => print!("{}", USAGE),
        Invocation::Version => println!("makegen {}", env!("CARGO_PKG_VERSION")),
        Invocation::Generate(config) => run(config)?,
    }
    Ok(())
}
