use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::Command;

use log::debug;

/// One installed Rust toolchain.
#[derive(Debug, Clone)]
pub struct ToolchainInstance {
    pub name: String,
    pub channel: String,
    pub path: PathBuf,
}

/// Detect installed toolchains via `rustup toolchain list -v`, falling back
/// to whatever `rustc` is on `PATH` when rustup is unavailable.
pub fn detect() -> Vec<ToolchainInstance> {
    match rustup_toolchains() {
        Some(instances) if !instances.is_empty() => instances,
        _ => path_rustc().into_iter().collect(),
    }
}

fn rustup_toolchains() -> Option<Vec<ToolchainInstance>> {
    let output = Command::new("rustup")
        .args(["toolchain", "list", "-v"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let instances = stdout
        .lines()
        .filter_map(parse_rustup_line)
        .collect::<Vec<_>>();
    debug!("rustup reported {} toolchain(s)", instances.len());
    Some(instances)
}

// Lines look like "stable-x86_64-unknown-linux-gnu (default)\t/home/u/.rustup/...".
fn parse_rustup_line(line: &str) -> Option<ToolchainInstance> {
    let (label, path) = line.split_once('\t')?;
    let name = label.split(" (").next()?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let channel = name.split('-').next().unwrap_or(&name).to_string();
    Some(ToolchainInstance {
        name,
        channel,
        path: PathBuf::from(path.trim()),
    })
}

fn path_rustc() -> Option<ToolchainInstance> {
    let output = Command::new("rustc").arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Some(ToolchainInstance {
        name: version,
        channel: "system".to_string(),
        path: PathBuf::from("rustc"),
    })
}

/// Pick the toolchain to run under.
///
/// A single detected instance, or `assume_first`, selects automatically.
/// Otherwise the user is prompted for a 1-based index; non-numeric or
/// out-of-range input re-prompts without limit. End of input while prompting
/// is an error.
pub fn select(
    instances: &[ToolchainInstance],
    assume_first: bool,
    mut input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<ToolchainInstance> {
    let first = instances
        .first()
        .ok_or_else(|| anyhow::anyhow!("no Rust toolchain detected"))?;
    if instances.len() == 1 || assume_first {
        return Ok(first.clone());
    }

    writeln!(output, "Multiple toolchains detected, please select one:")?;
    for (i, instance) in instances.iter().enumerate() {
        writeln!(output, "Instance {}", i + 1)?;
        writeln!(output, "    Name: {}", instance.name)?;
        writeln!(output, "    Channel: {}", instance.channel)?;
        writeln!(output, "    Path: {}", instance.path.display())?;
    }

    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            anyhow::bail!("no selection made before end of input");
        }
        match line.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= instances.len() => return Ok(instances[n - 1].clone()),
            _ => writeln!(output, "Input not accepted, try again.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn instance(name: &str) -> ToolchainInstance {
        ToolchainInstance {
            name: name.to_string(),
            channel: "stable".to_string(),
            path: PathBuf::from("/toolchains").join(name),
        }
    }

    #[test]
    fn single_instance_selects_automatically() {
        let instances = vec![instance("stable")];
        let selected = select(&instances, false, Cursor::new(""), Vec::new()).unwrap();
        assert_eq!(selected.name, "stable");
    }

    #[test]
    fn assume_flag_takes_the_first_of_many() {
        let instances = vec![instance("a"), instance("b")];
        let selected = select(&instances, true, Cursor::new(""), Vec::new()).unwrap();
        assert_eq!(selected.name, "a");
    }

    #[test]
    fn invalid_input_reprompts_until_a_valid_index() {
        let instances = vec![instance("a"), instance("b")];
        let mut prompt = Vec::new();
        let selected = select(
            &instances,
            false,
            Cursor::new("zero\n9\n2\n"),
            &mut prompt,
        )
        .unwrap();
        assert_eq!(selected.name, "b");
        let prompt = String::from_utf8(prompt).unwrap();
        assert_eq!(prompt.matches("Input not accepted").count(), 2);
    }

    #[test]
    fn end_of_input_while_prompting_is_an_error() {
        let instances = vec![instance("a"), instance("b")];
        assert!(select(&instances, false, Cursor::new(""), Vec::new()).is_err());
    }

    #[test]
    fn no_instances_is_an_error() {
        assert!(select(&[], false, Cursor::new(""), Vec::new()).is_err());
    }

    #[test]
    fn parses_rustup_verbose_lines() {
        let parsed =
            parse_rustup_line("stable-x86_64-unknown-linux-gnu (default)\t/home/u/.rustup/t/stable")
                .unwrap();
        assert_eq!(parsed.name, "stable-x86_64-unknown-linux-gnu");
        assert_eq!(parsed.channel, "stable");
        assert_eq!(parsed.path, PathBuf::from("/home/u/.rustup/t/stable"));
    }
}
