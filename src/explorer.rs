use crate::config::Config;
use crate::models::filter::{FilterState, SearchMode};
use crate::services::controller::{Completion, FetchStatus, ResultController, Transport};
use crate::services::debounce::Debouncer;
use crate::services::query::{build_request, RequestSpec};
use crate::utils::format::{render, LOADING_NOTICE};
use crate::utils::input::{parse_toggle, sanitize_language, sanitize_year};
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

pub const HELP: &str = "\
Type text to search. Commands:
  /mode <smart|title|author|subject|isbn>
  /from <year>      /to <year>       (empty clears)
  /lang <code>      (empty clears)
  /ebooks [on|off]  (toggles without argument)
  /next  /prev  /page <n>
  /search           run the pending text now
  /help  /quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Query(String),
    Mode(SearchMode),
    YearStart(Option<u32>),
    YearEnd(Option<u32>),
    Language(Option<String>),
    Ebooks(Option<bool>),
    Next,
    Previous,
    Page(u32),
    Search,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '/{0}', try /help")]
    Unknown(String),
    #[error("/{command} needs an argument")]
    MissingArgument { command: &'static str },
    #[error("Invalid argument for /{command}: '{value}'")]
    InvalidArgument { command: &'static str, value: String },
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(Command::Query(line.trim().to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest.trim(), ""),
    };

    match name.to_lowercase().as_str() {
        "mode" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument { command: "mode" });
            }
            arg.parse()
                .map(Command::Mode)
                .map_err(|_| CommandError::InvalidArgument {
                    command: "mode",
                    value: arg.to_string(),
                })
        }
        "from" => Ok(Command::YearStart(sanitize_year(arg))),
        "to" => Ok(Command::YearEnd(sanitize_year(arg))),
        "lang" => Ok(Command::Language(sanitize_language(arg))),
        "ebooks" if arg.is_empty() => Ok(Command::Ebooks(None)),
        "ebooks" => parse_toggle(arg)
            .map(|on| Command::Ebooks(Some(on)))
            .ok_or_else(|| CommandError::InvalidArgument {
                command: "ebooks",
                value: arg.to_string(),
            }),
        "next" => Ok(Command::Next),
        "prev" => Ok(Command::Previous),
        "page" => {
            if arg.is_empty() {
                return Err(CommandError::MissingArgument { command: "page" });
            }
            arg.parse::<u32>()
                .ok()
                .filter(|page| *page >= 1)
                .map(Command::Page)
                .ok_or_else(|| CommandError::InvalidArgument {
                    command: "page",
                    value: arg.to_string(),
                })
        }
        "search" => Ok(Command::Search),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Terminal front end: one cooperative loop over user input, the query
/// debounce timer and fetch completions.
pub struct Explorer<W: Write> {
    config: Arc<Config>,
    transport: Transport,
    filters: FilterState,
    controller: ResultController,
    debouncer: Debouncer<String>,
    last_spec: Option<RequestSpec>,
    out: W,
}

impl<W: Write> Explorer<W> {
    pub fn new(config: Arc<Config>, transport: Transport, out: W) -> Self {
        Self::with_filters(config, transport, FilterState::default(), out)
    }

    pub fn with_filters(
        config: Arc<Config>,
        transport: Transport,
        filters: FilterState,
        out: W,
    ) -> Self {
        let debouncer = Debouncer::new(config.debounce);
        Self {
            config,
            transport,
            filters,
            controller: ResultController::new(),
            debouncer,
            last_spec: None,
            out,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn controller(&self) -> &ResultController {
        &self.controller
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run<R>(&mut self, input: R) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let (completions, mut incoming) = mpsc::unbounded_channel::<Completion>();
        let mut lines = input.lines();
        let mut input_open = true;

        writeln!(self.out, "Library Explorer ({})", self.filters.mode().placeholder())?;
        self.sync(&completions)?;

        loop {
            if !input_open && !self.debouncer.is_pending() && !self.is_loading() {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => match line? {
                    Some(line) => {
                        if !self.handle_line(&line, &completions)? {
                            break;
                        }
                    }
                    None => {
                        debug!("Input closed");
                        input_open = false;
                    }
                },
                query = self.debouncer.ready(), if self.debouncer.is_pending() => {
                    self.filters.set_query(query);
                    self.sync(&completions)?;
                }
                Some(completion) = incoming.recv() => {
                    if self.controller.apply(completion) {
                        self.show()?;
                    }
                }
            }
        }

        info!("Explorer session finished");
        Ok(())
    }

    fn is_loading(&self) -> bool {
        *self.controller.status() == FetchStatus::Loading
    }

    fn handle_line(
        &mut self,
        line: &str,
        completions: &UnboundedSender<Completion>,
    ) -> io::Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }
        match parse_command(line) {
            Ok(command) => self.handle(command, completions),
            Err(e) => {
                writeln!(self.out, "{}", e)?;
                Ok(true)
            }
        }
    }

    /// Applies one command. Returns false when the session should end.
    pub fn handle(
        &mut self,
        command: Command,
        completions: &UnboundedSender<Completion>,
    ) -> io::Result<bool> {
        match command {
            Command::Query(text) => {
                self.debouncer.push(text);
                return Ok(true);
            }
            Command::Mode(mode) => {
                self.filters.set_mode(mode);
                writeln!(self.out, "{}", mode.placeholder())?;
            }
            Command::YearStart(year) => {
                self.filters.set_year_start(year);
            }
            Command::YearEnd(year) => {
                self.filters.set_year_end(year);
            }
            Command::Language(language) => {
                self.filters.set_language(language);
            }
            Command::Ebooks(toggle) => {
                let on = toggle.unwrap_or(!self.filters.ebooks_only());
                self.filters.set_ebooks_only(on);
            }
            Command::Next => {
                if !self.can_go_next() {
                    writeln!(self.out, "Already on the last page.")?;
                    return Ok(true);
                }
                self.filters.next_page();
            }
            Command::Previous => {
                if self.filters.page() <= 1 {
                    writeln!(self.out, "Already on the first page.")?;
                    return Ok(true);
                }
                self.filters.previous_page();
            }
            Command::Page(page) => {
                self.filters.set_page(page);
            }
            Command::Search => {
                let changed = match self.debouncer.flush() {
                    Some(text) => self.filters.set_query(text),
                    None => false,
                };
                if !changed {
                    self.filters.set_page(1);
                }
            }
            Command::Help => {
                writeln!(self.out, "{}", HELP)?;
                return Ok(true);
            }
            Command::Quit => return Ok(false),
        }

        self.sync(completions)?;
        Ok(true)
    }

    /// Next needs a settled result that reports pages past the current one.
    fn can_go_next(&self) -> bool {
        matches!(self.controller.status(), FetchStatus::Success)
            && u64::from(self.filters.page()) < self.controller.page().total_pages()
    }

    /// Rebuilds the request and dispatches it if it differs from the last one.
    fn sync(&mut self, completions: &UnboundedSender<Completion>) -> io::Result<()> {
        let spec = build_request(&self.config.api_url, &self.filters);
        if self.last_spec.as_ref() == Some(&spec) {
            return Ok(());
        }

        self.controller.dispatch(&spec, &self.transport, completions);
        self.last_spec = Some(spec);
        writeln!(self.out, "{}", LOADING_NOTICE)?;
        Ok(())
    }

    fn show(&mut self) -> io::Result<()> {
        let text = render(
            &self.controller.view(),
            self.controller.page(),
            &self.config.covers_url,
            &self.config.site_url,
        );
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::{FetchError, SearchTransport};
    use async_trait::async_trait;
    use reqwest::Url;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::io::{duplex, AsyncWriteExt, BufReader};
    use tokio::time::{sleep, Instant};

    /// Answers every search with one "Dune" doc per page. Title searches for
    /// "Dune" report 45 matches (three pages), everything else one.
    #[derive(Default)]
    struct RecordingTransport {
        urls: Mutex<Vec<String>>,
    }

    impl RecordingTransport {
        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchTransport for RecordingTransport {
        async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
            self.urls.lock().unwrap().push(url.to_string());

            let total: u64 = if url.query().unwrap_or("").contains("title=Dune") {
                45
            } else {
                1
            };
            let page: u64 = url
                .query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
                .unwrap_or(1);
            let docs = if (page - 1) * 20 < total {
                r#"[{"title":"Dune","author_name":["Frank Herbert"]}]"#
            } else {
                "[]"
            };

            Ok(format!(r#"{{"docs":{},"numFound":{}}}"#, docs, total))
        }
    }

    fn session(filters: FilterState) -> (Arc<RecordingTransport>, Explorer<Vec<u8>>) {
        let transport = Arc::new(RecordingTransport::default());
        let explorer = Explorer::with_filters(
            Arc::new(Config::default()),
            transport.clone(),
            filters,
            Vec::new(),
        );
        (transport, explorer)
    }

    fn title_search(query: &str) -> FilterState {
        let mut filters = FilterState::empty();
        filters.set_mode(SearchMode::Title);
        filters.set_query(query);
        filters
    }

    fn dune_page(page: u32) -> String {
        format!(
            "https://openlibrary.org/search.json?title=Dune&page={}&limit=20",
            page
        )
    }

    /// Types `lines` into the session one at a time, `gap` apart, then
    /// closes input and waits for the session to settle.
    async fn type_lines(explorer: &mut Explorer<Vec<u8>>, lines: &[&str], gap: Duration) {
        let (mut keyboard, terminal) = duplex(1024);
        let lines: Vec<String> = lines.iter().map(|l| format!("{}\n", l)).collect();
        let typist = tokio::spawn(async move {
            for line in lines {
                sleep(gap).await;
                keyboard.write_all(line.as_bytes()).await.unwrap();
            }
        });

        explorer.run(BufReader::new(terminal)).await.unwrap();
        typist.await.unwrap();
    }

    fn output(explorer: Explorer<Vec<u8>>) -> String {
        String::from_utf8(explorer.into_output()).unwrap()
    }

    #[test]
    fn plain_text_is_a_query() {
        assert_eq!(
            parse_command("  kafka on the shore "),
            Ok(Command::Query("kafka on the shore".into()))
        );
    }

    #[test]
    fn commands_parse_with_sanitized_arguments() {
        assert_eq!(parse_command("/mode Author"), Ok(Command::Mode(SearchMode::Author)));
        assert_eq!(parse_command("/from 19x65"), Ok(Command::YearStart(Some(1965))));
        assert_eq!(parse_command("/to"), Ok(Command::YearEnd(None)));
        assert_eq!(parse_command("/lang english"), Ok(Command::Language(Some("eng".into()))));
        assert_eq!(parse_command("/ebooks"), Ok(Command::Ebooks(None)));
        assert_eq!(parse_command("/ebooks off"), Ok(Command::Ebooks(Some(false))));
        assert_eq!(parse_command("/page 3"), Ok(Command::Page(3)));
        assert_eq!(parse_command("/quit"), Ok(Command::Quit));
    }

    #[test]
    fn bad_commands_are_reported() {
        assert_eq!(
            parse_command("/genre sf"),
            Err(CommandError::Unknown("genre".into()))
        );
        assert_eq!(
            parse_command("/mode"),
            Err(CommandError::MissingArgument { command: "mode" })
        );
        assert!(matches!(
            parse_command("/page 0"),
            Err(CommandError::InvalidArgument { command: "page", .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_keystrokes_send_one_request() {
        let (transport, mut explorer) = session(title_search(""));

        type_lines(&mut explorer, &["D", "Du", "Dune"], Duration::from_millis(200)).await;

        assert_eq!(explorer.filters().query(), "Dune");
        assert_eq!(
            transport.urls(),
            vec![
                "https://openlibrary.org/search.json?title=&page=1&limit=20".to_string(),
                dune_page(1),
            ]
        );

        let page = explorer.controller().page();
        assert_eq!(page.total_count, 45);
        assert_eq!(page.total_pages(), 3);

        let text = output(explorer);
        assert!(text.contains("Page 1 / 3 • 45 results"));
        assert!(text.contains("Frank Herbert"));
    }

    #[tokio::test(start_paused = true)]
    async fn next_and_prev_refetch_without_touching_filters() {
        let mut filters = title_search("Dune");
        filters.set_year_start(Some(1960));
        filters.set_language(Some("en".into()));
        let (transport, mut explorer) = session(filters);

        type_lines(
            &mut explorer,
            &["/next", "/next", "/next", "/prev"],
            Duration::from_secs(1),
        )
        .await;

        let queries: Vec<String> = transport
            .urls()
            .iter()
            .filter_map(|url| Url::parse(url).ok()?.query().map(str::to_string))
            .collect();
        assert_eq!(
            queries,
            vec![
                "title=Dune&first_publish_year=1960-&language=en&page=1&limit=20",
                "title=Dune&first_publish_year=1960-&language=en&page=2&limit=20",
                "title=Dune&first_publish_year=1960-&language=en&page=3&limit=20",
                "title=Dune&first_publish_year=1960-&language=en&page=2&limit=20",
            ]
        );

        assert_eq!(explorer.filters().page(), 2);
        assert_eq!(explorer.filters().year_start(), Some(1960));
        assert_eq!(explorer.filters().language(), Some("en"));
        assert!(output(explorer).contains("Already on the last page."));
    }

    #[tokio::test(start_paused = true)]
    async fn prev_is_refused_on_first_page() {
        let (transport, mut explorer) = session(title_search("Dune"));

        type_lines(&mut explorer, &["/prev"], Duration::from_secs(1)).await;

        assert_eq!(transport.urls(), vec![dune_page(1)]);
        assert!(output(explorer).contains("Already on the first page."));
    }

    #[tokio::test(start_paused = true)]
    async fn prev_works_after_overshooting_last_page() {
        let (transport, mut explorer) = session(title_search("Dune"));

        type_lines(&mut explorer, &["/page 50", "/prev"], Duration::from_secs(1)).await;

        assert_eq!(
            transport.urls(),
            vec![dune_page(1), dune_page(50), dune_page(49)]
        );
        assert_eq!(explorer.filters().page(), 49);

        let text = output(explorer);
        assert!(text.contains("No results."));
        assert!(!text.contains("Already on the first page."));
    }

    #[tokio::test(start_paused = true)]
    async fn search_flushes_pending_text_immediately() {
        let mut filters = title_search("Dun");
        filters.set_page(2);
        let (transport, mut explorer) = session(filters);
        let start = Instant::now();

        type_lines(&mut explorer, &["Dune", "/search"], Duration::from_millis(10)).await;

        assert!(start.elapsed() < Duration::from_millis(500));
        assert_eq!(
            transport.urls(),
            vec![
                "https://openlibrary.org/search.json?title=Dun&page=2&limit=20".to_string(),
                dune_page(1),
            ]
        );
        assert_eq!(explorer.filters().page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn search_without_pending_text_returns_to_first_page() {
        let (transport, mut explorer) = session(title_search("Dune"));

        type_lines(&mut explorer, &["/next", "/search"], Duration::from_secs(1)).await;

        assert_eq!(
            transport.urls(),
            vec![dune_page(1), dune_page(2), dune_page(1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_request_is_not_refetched() {
        let (transport, mut explorer) = session(title_search("Dune"));

        type_lines(
            &mut explorer,
            &["/lang en", "/lang EN", "/mode title"],
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(
            transport.urls(),
            vec![
                dune_page(1),
                "https://openlibrary.org/search.json?title=Dune&language=en&page=1&limit=20"
                    .to_string(),
            ]
        );
        assert_eq!(output(explorer).matches(LOADING_NOTICE).count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_ends_session_immediately() {
        let (_, mut explorer) = session(FilterState::default());
        explorer.run(&b"/quit\n/mode isbn\n"[..]).await.unwrap();
        assert_eq!(explorer.filters().mode(), SearchMode::Smart);
    }
}
