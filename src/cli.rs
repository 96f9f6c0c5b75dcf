use std::{env, path, process};

use crate::config::CselConfig;

fn usage() -> ! {
    println!(
        "Usage: {} [options]

  -c, --config <config>   Specify a config file.
  -x, --fill <colors>     Fill the screen directly, bypassing the TUI
                          (e.g. '#ff4757' or '#ff4757,#1e90ff' for a gradient).
  -ss <search>            Pre-fill search in TUI (must be last option).
      --clear-recent      Clear the recent color history.
      --renderer <path>   Override the overlay renderer script path.
      --runtime <cmd>     Override the renderer runtime command.
      --no-exec           Print the resolved HEX value(s) to stdout instead of launching.
  -v, --verbose           Increase verbosity level (multiple).
  -h, --help              Show this help message.
  -V, --version           Show the version number and quit.
",
        &env::args().next().unwrap_or_else(|| "csel".to_string())
    );
    std::process::exit(0);
}

/// Command line interface.
#[derive(Debug)]
pub struct Opts {
    /// Highlight color used in the UI
    pub highlight_color: ratatui::style::Color,
    /// Cursor character for the search
    pub cursor: String,
    /// Don't scroll past the last/first item
    pub hard_stop: bool,
    /// Use rounded borders
    pub rounded_borders: bool,
    /// Border colors for different panels
    pub main_border_color: ratatui::style::Color,
    pub list_border_color: ratatui::style::Color,
    pub input_border_color: ratatui::style::Color,
    /// Text colors for different panels
    pub main_text_color: ratatui::style::Color,
    pub list_text_color: ratatui::style::Color,
    pub input_text_color: ratatui::style::Color,
    /// Color for panel header titles
    pub header_title_color: ratatui::style::Color,
    /// Verbosity level
    pub verbose: Option<u64>,
    /// Print the resolved hex values instead of launching the renderer
    pub no_exec: bool,
    /// Clear the recent color history and exit
    pub clear_recent: bool,
    /// Direct fill request (bypasses TUI): '#hex' or '#hex,#hex'
    pub fill: Option<String>,
    /// Search string to pre-populate in TUI
    pub search_string: Option<String>,
    /// Runtime command that executes the renderer script
    pub renderer_runtime: String,
    /// Renderer script path override
    pub renderer_script: Option<path::PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            highlight_color: ratatui::style::Color::LightBlue,
            cursor: "█".to_string(),
            hard_stop: false,
            rounded_borders: true,
            main_border_color: ratatui::style::Color::White,
            list_border_color: ratatui::style::Color::White,
            input_border_color: ratatui::style::Color::White,
            main_text_color: ratatui::style::Color::White,
            list_text_color: ratatui::style::Color::White,
            input_text_color: ratatui::style::Color::White,
            header_title_color: ratatui::style::Color::White,
            verbose: None,
            no_exec: false,
            clear_recent: false,
            fill: None,
            search_string: None,
            renderer_runtime: "swift".to_string(),
            renderer_script: None,
        }
    }
}

/// Parses the cli arguments
pub fn parse() -> Result<Opts, lexopt::Error> {
    use lexopt::prelude::*;
    let mut parser = lexopt::Parser::from_env();
    let mut default = Opts::default();
    let mut config_file: Option<path::PathBuf> = None;
    let mut runtime_override: Option<String> = None;

    // Check for -ss option first and handle it specially
    let args: Vec<String> = env::args().collect();
    if let Some(ss_pos) = args.iter().position(|arg| arg == "-ss") {
        // Everything after -ss is the search string
        if ss_pos + 1 < args.len() {
            let search_parts: Vec<String> = args[ss_pos + 1..].to_vec();
            default.search_string = Some(search_parts.join(" "));
        } else {
            default.search_string = Some(String::new());
        }
        let filtered_args: Vec<String> = args[..ss_pos].to_vec();
        parser = lexopt::Parser::from_args(filtered_args.into_iter().skip(1));
    }

    while let Some(arg) = parser.next()? {
        match arg {
            Short('c') | Long("config") => {
                config_file = Some(path::PathBuf::from(parser.value()?));
            }
            Short('x') | Long("fill") => {
                default.fill = Some(
                    parser
                        .value()?
                        .into_string()
                        .map_err(|_| "Fill value must be valid UTF-8")?,
                );
            }
            Long("clear-recent") => {
                default.clear_recent = true;
            }
            Long("no-exec") => {
                default.no_exec = true;
            }
            Long("renderer") => {
                default.renderer_script = Some(path::PathBuf::from(parser.value()?));
            }
            Long("runtime") => {
                runtime_override = Some(
                    parser
                        .value()?
                        .into_string()
                        .map_err(|_| "Runtime command must be valid UTF-8")?,
                );
            }
            Short('v') | Long("verbose") => {
                if let Some(v) = default.verbose {
                    default.verbose = Some(v + 1);
                } else {
                    default.verbose = Some(1);
                }
            }
            Short('h') | Long("help") => {
                usage();
            }
            Short('V') | Long("version") => {
                println!("{}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            _ => return Err(arg.unexpected()),
        }
    }

    let conf = match CselConfig::new(config_file) {
        Ok(conf) => conf,
        Err(e) => {
            eprintln!("Error reading config file:\n\t{}", e);
            process::exit(1);
        }
    };

    merge_config(&mut default, conf, runtime_override);

    Ok(default)
}

/// Fold config-file values into the parsed options. An explicit
/// `--runtime` always wins, even when it equals the built-in default.
fn merge_config(default: &mut Opts, conf: CselConfig, runtime_override: Option<String>) {
    default.renderer_runtime = runtime_override.unwrap_or(conf.renderer.runtime);
    if default.renderer_script.is_none() {
        default.renderer_script = conf.renderer.script;
    }

    match string_to_color(&conf.ui.highlight_color) {
        Ok(c) => default.highlight_color = c,
        Err(_) => eprintln!("Warning: Invalid highlight_color in config"),
    }
    default.cursor = conf.ui.cursor;
    default.hard_stop = conf.ui.hard_stop;
    default.rounded_borders = conf.ui.rounded_borders;

    let apply = |target: &mut ratatui::style::Color, raw: &str, name: &str| {
        match string_to_color(raw) {
            Ok(c) => *target = c,
            Err(_) => eprintln!("Warning: Invalid {} in config", name),
        }
    };
    apply(&mut default.main_border_color, &conf.ui.main_border_color, "main_border_color");
    apply(&mut default.list_border_color, &conf.ui.list_border_color, "list_border_color");
    apply(&mut default.input_border_color, &conf.ui.input_border_color, "input_border_color");
    apply(&mut default.main_text_color, &conf.ui.main_text_color, "main_text_color");
    apply(&mut default.list_text_color, &conf.ui.list_text_color, "list_text_color");
    apply(&mut default.input_text_color, &conf.ui.input_text_color, "input_text_color");
    apply(&mut default.header_title_color, &conf.ui.header_title_color, "header_title_color");
}

/// Parses a [String] into a ratatui color. Case-insensitive; accepts
/// named colors, hex (`#ff0000`) and 8-bit indices.
pub fn string_to_color<T: AsRef<str>>(val: T) -> Result<ratatui::style::Color, &'static str> {
    let color_str = val.as_ref();

    // Hex colors need the # prefix so 8-bit indices stay unambiguous
    if color_str.starts_with('#') {
        return crate::hex::normalize(color_str)
            .as_deref()
            .and_then(crate::hex::rgb_of)
            .map(|(r, g, b)| ratatui::style::Color::Rgb(r, g, b))
            .ok_or("invalid hex color");
    }

    // Try 8-bit color index (e.g., "125")
    if let Ok(index) = color_str.parse::<u8>() {
        return Ok(ratatui::style::Color::Indexed(index));
    }

    // Named colors (case-insensitive)
    match color_str.to_lowercase().as_ref() {
        "black" => Ok(ratatui::style::Color::Black),
        "red" => Ok(ratatui::style::Color::Red),
        "green" => Ok(ratatui::style::Color::Green),
        "yellow" => Ok(ratatui::style::Color::Yellow),
        "blue" => Ok(ratatui::style::Color::Blue),
        "magenta" => Ok(ratatui::style::Color::Magenta),
        "cyan" => Ok(ratatui::style::Color::Cyan),
        "gray" | "grey" => Ok(ratatui::style::Color::Gray),
        "darkgray" | "darkgrey" => Ok(ratatui::style::Color::DarkGray),
        "lightred" => Ok(ratatui::style::Color::LightRed),
        "lightgreen" => Ok(ratatui::style::Color::LightGreen),
        "lightyellow" => Ok(ratatui::style::Color::LightYellow),
        "lightblue" => Ok(ratatui::style::Color::LightBlue),
        "lightmagenta" => Ok(ratatui::style::Color::LightMagenta),
        "lightcyan" => Ok(ratatui::style::Color::LightCyan),
        "white" => Ok(ratatui::style::Color::White),
        "reset" => Ok(ratatui::style::Color::Reset),
        _ => Err("unknown color format. Use: named colors (red, blue, etc.), hex (#ff0000), or 8-bit index (0-255)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_color() {
        assert_eq!(
            string_to_color("#ff0000"),
            Ok(ratatui::style::Color::Rgb(255, 0, 0))
        );
        assert_eq!(
            string_to_color("#f00"),
            Ok(ratatui::style::Color::Rgb(255, 0, 0))
        );
        assert_eq!(
            string_to_color("LightBlue"),
            Ok(ratatui::style::Color::LightBlue)
        );
        assert_eq!(
            string_to_color("125"),
            Ok(ratatui::style::Color::Indexed(125))
        );
        assert!(string_to_color("chartreuse-ish").is_err());
    }

    #[test]
    fn test_explicit_runtime_beats_config() {
        let mut conf = CselConfig::default();
        conf.renderer.runtime = "osascript -l JavaScript".to_string();

        // an explicit value identical to the built-in default still wins
        let mut opts = Opts::default();
        merge_config(&mut opts, conf.clone(), Some("swift".to_string()));
        assert_eq!(opts.renderer_runtime, "swift");

        // no explicit value: the config file decides
        let mut opts = Opts::default();
        merge_config(&mut opts, conf, None);
        assert_eq!(opts.renderer_runtime, "osascript -l JavaScript");
    }
}
