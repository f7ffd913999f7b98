//! plexmark - render lightweight markup to HTML, TeX or pseudo-XML

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use plexmark_render::{OutputFormat, RenderOptions, Renderer};

#[derive(Parser, Debug)]
#[command(name = "plexmark")]
#[command(version, about = "Render lightweight markup to HTML, TeX or pseudo-XML", long_about = None)]
#[command(after_help = "EXAMPLES:
    plexmark notes.txt                  HTML fragment on stdout
    plexmark -f tex --whole paper.txt   Complete LaTeX article
    plexmark --props < page.txt         JSON with output and metadata")]
struct Cli {
    /// Input file, stdin when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file, stdout when omitted
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Output format: html, xhtml, tex, latex or raw
    #[arg(short, long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Encoding of the input
    #[arg(short, long)]
    encoding: Option<String>,

    /// Print a JSON object with the output and the metadata fields
    #[arg(long)]
    props: bool,

    /// Wrap the fragment in docinfo and document divs
    #[arg(long)]
    docinfo: bool,

    /// Produce a complete document
    #[arg(long)]
    whole: bool,

    /// Skip the typographic pass
    #[arg(long)]
    no_typography: bool,

    /// YAML file with render options, overridden by flags
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value.parse().map_err(|err: plexmark_core::RenderError| err.to_string())
}

#[derive(Serialize)]
struct PropsOutput<'a> {
    output: &'a str,
    props: &'a plexmark_core::Properties,
}

impl Cli {
    fn options(&self) -> Result<RenderOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_yaml::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => RenderOptions::default(),
        };

        if let Some(format) = self.format {
            options.format = format;
        }
        if let Some(encoding) = &self.encoding {
            options.encoding = encoding.clone();
        }
        options.with_props |= self.props;
        options.with_docinfo |= self.docinfo;
        options.as_whole |= self.whole;
        if self.no_typography {
            options.enable_typography = false;
        }
        Ok(options)
    }
}

fn read_input(input: Option<&PathBuf>) -> Result<Vec<u8>> {
    match input {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut bytes = Vec::new();
            io::stdin()
                .read_to_end(&mut bytes)
                .context("reading stdin")?;
            Ok(bytes)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options()?;
    log::debug!("rendering with {options:?}");
    let source = read_input(cli.input.as_ref())?;

    let renderer = Renderer::new(options);
    let rendered = renderer.render(&source)?;

    let text = match &rendered.props {
        Some(props) if cli.props => {
            let mut json = serde_json::to_string_pretty(&PropsOutput {
                output: &rendered.output,
                props,
            })?;
            json.push('\n');
            json
        }
        _ if rendered.output.ends_with('\n') => rendered.output.clone(),
        _ => format!("{}\n", rendered.output),
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        }
        None => io::stdout().lock().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "plexmark",
            "-f",
            "latex",
            "--whole",
            "--no-typography",
            "-e",
            "latin-1",
            "doc.txt",
        ])
        .unwrap();
        let options = cli.options().unwrap();
        assert_eq!(options.format, OutputFormat::Tex);
        assert!(options.as_whole);
        assert!(!options.enable_typography);
        assert_eq!(options.encoding, "latin-1");
        assert_eq!(cli.input, Some(PathBuf::from("doc.txt")));
    }

    #[test]
    fn unknown_format_is_a_usage_error() {
        assert!(Cli::try_parse_from(["plexmark", "-f", "pdf"]).is_err());
    }

    #[test]
    fn config_file_is_overridden_by_flags() {
        let path = std::env::temp_dir().join(format!("plexmark-cli-{}.yaml", std::process::id()));
        fs::write(&path, "format: raw\nwith_docinfo: true\nwiki_link_suffix: \"\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "plexmark".into(),
            "-c".into(),
            path.clone().into_os_string(),
            "--props".into(),
        ])
        .unwrap();
        let options = cli.options().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(options.format, OutputFormat::Raw);
        assert!(options.with_docinfo);
        assert!(options.with_props);
        assert_eq!(options.wiki_link_suffix, "");
        assert_eq!(options.tab_width, 4);
    }

    #[test]
    fn props_json_shape() {
        let options = RenderOptions {
            with_props: true,
            ..RenderOptions::default()
        };
        let rendered = Renderer::new(options).render("# Hello\n\nWorld.").unwrap();
        let json = serde_json::to_value(PropsOutput {
            output: &rendered.output,
            props: rendered.props.as_ref().unwrap(),
        })
        .unwrap();
        assert_eq!(json["output"], "<p>World.</p>");
        assert_eq!(json["props"]["title"], "Hello");
    }
}
