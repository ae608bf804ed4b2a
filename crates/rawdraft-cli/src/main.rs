mod document;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use document::LoadedDocument;
use rawdraft_config::{BlockKeyStyle, Config};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

const USAGE: &str = "[--dump] [--stable-keys] [raw-content.json]";

#[derive(Debug, Default, PartialEq)]
struct Args {
    dump: bool,
    stable_keys: bool,
    input: Option<PathBuf>,
}

impl Args {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut parsed = Args::default();
        for arg in args {
            match arg.as_str() {
                "--dump" => parsed.dump = true,
                "--stable-keys" => parsed.stable_keys = true,
                flag if flag.starts_with("--") => return Err(format!("Unknown option {flag}")),
                path if parsed.input.is_none() => parsed.input = Some(PathBuf::from(path)),
                _ => return Err("Only one input file may be given".to_string()),
            }
        }
        Ok(parsed)
    }
}

struct App {
    document: LoadedDocument,
    block_list_state: ListState,
    current_content: Vec<String>,
}

impl App {
    fn new(document: LoadedDocument) -> Self {
        let mut app = Self {
            document,
            block_list_state: ListState::default(),
            current_content: Vec::new(),
        };

        // Select first block if available
        if !app.document.blocks.is_empty() {
            app.block_list_state.select(Some(0));
            app.update_content_for_selection();
        }

        app
    }

    fn next_block(&mut self) {
        if self.document.blocks.is_empty() {
            return;
        }
        let i = match self.block_list_state.selected() {
            Some(i) => (i + 1) % self.document.blocks.len(),
            None => 0,
        };
        self.block_list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn previous_block(&mut self) {
        if self.document.blocks.is_empty() {
            return;
        }
        let i = match self.block_list_state.selected() {
            Some(0) | None => self.document.blocks.len() - 1,
            Some(i) => i - 1,
        };
        self.block_list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn update_content_for_selection(&mut self) {
        if let Some(index) = self.block_list_state.selected()
            && let Some(block) = self.document.blocks.get(index)
        {
            self.current_content = self.document.annotation_lines(block);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let argv: Vec<String> = env::args().collect();
    let program = argv.first().map(String::as_str).unwrap_or("rawdraft-cli");
    let args = match Args::parse(argv.get(1..).unwrap_or(&[])) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {program} {USAGE}");
            process::exit(1);
        }
    };

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            log::warn!("Ignoring config file: {e}");
            Config::default()
        }
    };

    let Some(input) = args.input.or(config.default_input) else {
        eprintln!("Error: No input file provided and no default_input configured");
        eprintln!("Usage: {program} {USAGE}");
        eprintln!("Or set default_input in {}", config_path.display());
        process::exit(1);
    };

    let mut settings = config.conversion;
    if args.stable_keys {
        settings.block_keys = BlockKeyStyle::Sequential;
    }

    let document = match LoadedDocument::load(&input, settings) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: Failed to convert '{}': {e}", input.display());
            process::exit(1);
        }
    };

    if args.dump {
        for line in document.summary_lines() {
            println!("{line}");
        }
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(document);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_block(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_block(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(rows[0]);

    // Block list panel
    let block_items: Vec<ListItem> = app
        .document
        .blocks
        .iter()
        .map(|block| {
            let indent = "  ".repeat(block.depth());
            let display_text = format!("{}{} {}", indent, block.block_type(), block.text());
            ListItem::new(vec![Line::from(vec![Span::raw(display_text)])])
        })
        .collect();

    let block_list = List::new(block_items)
        .block(Block::default().borders(Borders::ALL).title("Blocks"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(block_list, chunks[0], &mut app.block_list_state);

    // Annotation panel
    let content_text = if app.current_content.is_empty() {
        vec![Line::from("Document has no blocks")]
    } else {
        app.current_content
            .iter()
            .map(|line| Line::from(vec![Span::raw(line.clone())]))
            .collect()
    };

    let title = format!("Annotations ({} entities)", app.document.registry.len());
    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(content, chunks[1]);

    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next"),
    ]);

    f.render_widget(Paragraph::new(vec![help_text]), rows[1]);
}
