use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use mdblog::content::compile_markdown;
use mdblog::post_metadata::MARKDOWN_FILE;

use crate::CompileArgs;

fn read_source(input: Option<&Path>) -> Result<String> {
    let Some(input) = input else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Error reading markdown from stdin")?;
        return Ok(buf);
    };

    let path = if input.is_dir() {
        input.join(MARKDOWN_FILE)
    } else {
        input.to_path_buf()
    };
    fs::read_to_string(&path).with_context(|| format!("Error reading {}", path.display()))
}

pub(crate) fn compile_cmd(args: CompileArgs) -> Result<()> {
    let source = read_source(args.input.as_deref())?;
    let html = compile_markdown(&source).context("Error compiling markdown")?;

    match args.output {
        Some(output) => fs::write(&output, html)
            .with_context(|| format!("Error writing {}", output.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
