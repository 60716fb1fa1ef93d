use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("linechat {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: linechat");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("LINECHAT_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: peer={}, async={}, cli=true",
        cfg!(feature = "peer"),
        cfg!(feature = "async")
    );
    println!(
        "wire: newline-delimited utf-8, max line {} bytes",
        linechat_line::DEFAULT_MAX_LINE_LENGTH
    );

    Ok(SUCCESS)
}
