//! In-memory model of the car list application.
//!
//! [`SimulatedCarList`] plays the application server: it owns the records,
//! answers fixture resets and opens browser sessions. Each
//! [`SimulatedBrowser`] holds its own page (filter text, sort direction, open
//! form) and renders the table from the shared records.
//!
//! The page is eventually consistent the way the real one is:
//!
//! - nothing is rendered until `load_latency` after navigation
//! - typing into the filter, sorting and saving re-render the table
//!   `render_latency` later
//! - every re-render detaches the previous row and cell handles, which then
//!   fail with a stale error

use crate::catalog::dom;
use crate::driver::{Driver, Element, ElementRef, SessionFactory};
use crate::fixture::ResetGateway;
use crate::locator::Locator;
use crate::result::{DriverError, DriverErrorKind, DriverResult, HarnessResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Page-level controls, present once the page has loaded
const PAGE_CONTROLS: [&str; 5] = [
    dom::TABLE,
    dom::FILTER,
    dom::SORT_HEADER,
    dom::NEW,
    dom::SUBMIT_ERROR,
];

/// Form fields in cell order (after the key)
const FORM_FIELDS: [&str; 6] = [
    dom::YEAR,
    dom::REGISTERED,
    dom::MAKE,
    dom::MODEL,
    dom::DESCRIPTION,
    dom::PRICE,
];

/// Message shown when year or price is not a number
pub const NUMBER_MESSAGE: &str = "Year and price must be numbers";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One car in the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarRecord {
    /// Row key
    pub id: u32,
    /// Model year (the sort column)
    pub year: u16,
    /// Registration date as entered, e.g. `2002-5-1`
    pub registered: String,
    /// Manufacturer
    pub make: String,
    /// Model name
    pub model: String,
    /// Free text
    pub description: String,
    /// Price in whole units
    pub price: u32,
}

impl CarRecord {
    /// Cell texts in table order
    #[must_use]
    pub fn cells(&self) -> [String; 7] {
        [
            self.id.to_string(),
            self.year.to_string(),
            self.registered.clone(),
            self.make.clone(),
            self.model.clone(),
            self.description.clone(),
            self.price.to_string(),
        ]
    }

    /// The table filter matches on year and registration date
    fn matches_filter(&self, filter: &str) -> bool {
        filter.is_empty() || self.year.to_string().contains(filter) || self.registered.contains(filter)
    }
}

/// The five records restored by every reset
#[must_use]
pub fn fixture() -> Vec<CarRecord> {
    const ROWS: [(u32, u16, &str, &str, &str, &str, u32); 5] = [
        (936, 1997, "1999-1-1", "Ford", "E350", "ac, abs, moon", 3000),
        (937, 1999, "2002-5-1", "Chevy", "Venture", "None", 4900),
        (938, 1996, "2002-5-8", "Jeep", "Grand Cherokee", "Moon roof", 4799),
        (939, 2001, "2000-1-4", "Volvo", "V70", "Sport", 44799),
        (940, 2005, "2005-1-9", "Audi", "A4", "Diesel", 25000),
    ];
    ROWS.iter()
        .map(|&(id, year, registered, make, model, description, price)| CarRecord {
            id,
            year,
            registered: registered.to_string(),
            make: make.to_string(),
            model: model.to_string(),
            description: description.to_string(),
            price,
        })
        .collect()
}

/// Latencies of the simulated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTiming {
    /// Navigation until first render
    pub load_latency: Duration,
    /// Change until the table re-renders
    pub render_latency: Duration,
}

impl Default for SimulationTiming {
    fn default() -> Self {
        Self {
            load_latency: Duration::from_millis(30),
            render_latency: Duration::from_millis(20),
        }
    }
}

impl SimulationTiming {
    /// Render on the next observation
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            load_latency: Duration::ZERO,
            render_latency: Duration::ZERO,
        }
    }
}

#[derive(Debug)]
struct Backend {
    records: Mutex<Vec<CarRecord>>,
    timing: SimulationTiming,
    resets: AtomicUsize,
    sessions_opened: AtomicUsize,
    open_sessions: AtomicUsize,
}

/// The simulated application server
#[derive(Debug, Clone)]
pub struct SimulatedCarList {
    backend: Arc<Backend>,
}

impl Default for SimulatedCarList {
    fn default() -> Self {
        Self::with_timing(SimulationTiming::default())
    }
}

impl SimulatedCarList {
    /// Create an application holding the fixture
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an application with custom latencies
    #[must_use]
    pub fn with_timing(timing: SimulationTiming) -> Self {
        Self {
            backend: Arc::new(Backend {
                records: Mutex::new(fixture()),
                timing,
                resets: AtomicUsize::new(0),
                sessions_opened: AtomicUsize::new(0),
                open_sessions: AtomicUsize::new(0),
            }),
        }
    }

    /// Snapshot of the stored records
    #[must_use]
    pub fn records(&self) -> Vec<CarRecord> {
        lock(&self.backend.records).clone()
    }

    /// Number of resets served
    #[must_use]
    pub fn resets(&self) -> usize {
        self.backend.resets.load(Ordering::SeqCst)
    }

    /// Number of sessions ever opened
    #[must_use]
    pub fn sessions_opened(&self) -> usize {
        self.backend.sessions_opened.load(Ordering::SeqCst)
    }

    /// Number of sessions opened and not yet closed
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.backend.open_sessions.load(Ordering::SeqCst)
    }

    /// Open a browser on this application
    #[must_use]
    pub fn open_browser(&self) -> SimulatedBrowser {
        self.backend.sessions_opened.fetch_add(1, Ordering::SeqCst);
        self.backend.open_sessions.fetch_add(1, Ordering::SeqCst);
        SimulatedBrowser {
            page: Arc::new(Mutex::new(PageState::blank())),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl ResetGateway for SimulatedCarList {
    fn reset(&self) -> HarnessResult<()> {
        *lock(&self.backend.records) = fixture();
        self.backend.resets.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("simulated fixture restored");
        Ok(())
    }
}

impl SessionFactory for SimulatedCarList {
    fn open(&self) -> HarnessResult<Box<dyn Driver>> {
        Ok(Box::new(self.open_browser()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Edit(u32),
    New,
}

#[derive(Debug)]
struct PageState {
    url: Option<String>,
    loaded: bool,
    render_due: Option<Instant>,
    rows: Vec<CarRecord>,
    generation: u64,
    sort: Option<SortDirection>,
    form: Option<Form>,
    inputs: HashMap<&'static str, String>,
    submit_error: Option<String>,
    closed: bool,
}

impl PageState {
    fn blank() -> Self {
        Self {
            url: None,
            loaded: false,
            render_due: None,
            rows: Vec::new(),
            generation: 0,
            sort: None,
            form: None,
            inputs: HashMap::new(),
            submit_error: None,
            closed: false,
        }
    }

    fn settle(&mut self, backend: &Backend) {
        if self.render_due.is_some_and(|due| Instant::now() >= due) {
            self.render(backend);
        }
    }

    fn render(&mut self, backend: &Backend) {
        let filter = self.input(dom::FILTER).trim().to_string();
        let mut rows: Vec<CarRecord> = lock(&backend.records)
            .iter()
            .filter(|record| record.matches_filter(&filter))
            .cloned()
            .collect();
        match self.sort {
            Some(SortDirection::Ascending) => rows.sort_by_key(|record| record.year),
            Some(SortDirection::Descending) => rows.sort_by(|a, b| b.year.cmp(&a.year)),
            None => {}
        }
        self.rows = rows;
        self.generation += 1;
        self.loaded = true;
        self.render_due = None;
    }

    fn schedule_render(&mut self, latency: Duration) {
        self.render_due = Some(Instant::now() + latency);
    }

    fn input(&self, field: &str) -> &str {
        self.inputs.get(field).map_or("", String::as_str)
    }

    fn resolve(&self, selector: &str) -> Vec<Target> {
        if !self.loaded {
            return Vec::new();
        }
        if selector == dom::ROWS {
            return (0..self.rows.len()).map(Target::Row).collect();
        }
        match control(selector) {
            Some(control) if self.control_present(control) => vec![Target::Control(control)],
            _ => Vec::new(),
        }
    }

    fn control_present(&self, control: &str) -> bool {
        self.loaded && (PAGE_CONTROLS.contains(&control) || self.form.is_some())
    }

    fn is_live(&self, target: Target, generation: u64) -> bool {
        match target {
            Target::Row(row) | Target::Cell(row, _) | Target::EditLink(row) => {
                generation == self.generation && row < self.rows.len()
            }
            Target::Control(control) => self.control_present(control),
        }
    }

    fn open_form(&mut self, form: Form) {
        let record = match form {
            Form::Edit(id) => self.rows.iter().find(|record| record.id == id).cloned(),
            Form::New => None,
        };
        let cells = record.map(|record| record.cells());
        self.inputs.insert(
            dom::ID,
            cells.as_ref().map(|cells| cells[0].clone()).unwrap_or_default(),
        );
        for (column, &field) in FORM_FIELDS.iter().enumerate() {
            let value = cells
                .as_ref()
                .map(|cells| cells[column + 1].clone())
                .unwrap_or_default();
            self.inputs.insert(field, value);
        }
        self.submit_error = None;
        self.form = Some(form);
    }

    fn save(&mut self, backend: &Backend) {
        let Some(form) = self.form else {
            return;
        };
        let values: Vec<String> = FORM_FIELDS
            .iter()
            .map(|field| self.input(field).trim().to_string())
            .collect();
        if values.iter().any(String::is_empty) {
            self.submit_error = Some(dom::REQUIRED_MESSAGE.to_string());
            return;
        }
        let (Ok(year), Ok(price)) = (values[0].parse::<u16>(), values[5].parse::<u32>()) else {
            self.submit_error = Some(NUMBER_MESSAGE.to_string());
            return;
        };

        let mut records = lock(&backend.records);
        let id = match form {
            Form::Edit(id) => id,
            Form::New => records.iter().map(|record| record.id).max().unwrap_or(0) + 1,
        };
        let saved = CarRecord {
            id,
            year,
            registered: values[1].clone(),
            make: values[2].clone(),
            model: values[3].clone(),
            description: values[4].clone(),
            price,
        };
        match records.iter_mut().find(|record| record.id == id) {
            Some(existing) => *existing = saved,
            None => records.push(saved),
        }
        drop(records);

        self.form = None;
        self.submit_error = None;
        self.inputs.retain(|field, _| *field == dom::FILTER);
        self.schedule_render(backend.timing.render_latency);
    }
}

fn control(selector: &str) -> Option<&'static str> {
    PAGE_CONTROLS
        .iter()
        .chain(FORM_FIELDS.iter())
        .chain([dom::SAVE, dom::ID].iter())
        .find(|control| **control == selector)
        .copied()
}

fn is_editable(control: &str) -> bool {
    control == dom::FILTER || FORM_FIELDS.contains(&control)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Row(usize),
    Cell(usize, usize),
    EditLink(usize),
    Control(&'static str),
}

/// A browser session on the simulated application
#[derive(Debug)]
pub struct SimulatedBrowser {
    page: Arc<Mutex<PageState>>,
    backend: Arc<Backend>,
}

impl SimulatedBrowser {
    fn observe(&self) -> DriverResult<MutexGuard<'_, PageState>> {
        let mut page = lock(&self.page);
        if page.closed {
            return Err(DriverError::session("browser session closed"));
        }
        page.settle(&self.backend);
        Ok(page)
    }
}

impl Driver for SimulatedBrowser {
    fn navigate(&mut self, url: &str) -> DriverResult<()> {
        let mut page = lock(&self.page);
        if page.closed {
            return Err(DriverError::session("browser session closed"));
        }
        let generation = page.generation + 1;
        *page = PageState::blank();
        page.generation = generation;
        page.url = Some(url.to_string());
        page.schedule_render(self.backend.timing.load_latency);
        Ok(())
    }

    fn current_url(&self) -> DriverResult<String> {
        Ok(self
            .observe()?
            .url
            .clone()
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        let page = self.observe()?;
        let generation = page.generation;
        Ok(page
            .resolve(locator.selector())
            .into_iter()
            .map(|target| {
                Box::new(SimulatedElement {
                    page: Arc::clone(&self.page),
                    backend: Arc::clone(&self.backend),
                    target,
                    generation,
                }) as ElementRef
            })
            .collect())
    }

    fn close(&mut self) -> DriverResult<()> {
        let mut page = lock(&self.page);
        if !page.closed {
            page.closed = true;
            self.backend.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Handle to an element of a simulated page
#[derive(Debug)]
struct SimulatedElement {
    page: Arc<Mutex<PageState>>,
    backend: Arc<Backend>,
    target: Target,
    generation: u64,
}

impl SimulatedElement {
    fn with_page<T>(&self, f: impl FnOnce(&mut PageState, &Backend) -> DriverResult<T>) -> DriverResult<T> {
        let mut page = lock(&self.page);
        if page.closed {
            return Err(DriverError::session("browser session closed"));
        }
        page.settle(&self.backend);
        if !page.is_live(self.target, self.generation) {
            return Err(DriverError::stale(format!("{:?} was re-rendered", self.target)));
        }
        f(&mut page, &self.backend)
    }

    fn child(&self, target: Target) -> ElementRef {
        Box::new(Self {
            page: Arc::clone(&self.page),
            backend: Arc::clone(&self.backend),
            target,
            generation: self.generation,
        })
    }

    fn not_editable(&self) -> DriverError {
        DriverError::new(
            DriverErrorKind::Unsupported,
            format!("{:?} does not accept input", self.target),
        )
    }
}

impl Element for SimulatedElement {
    fn text(&self) -> DriverResult<String> {
        self.with_page(|page, _| {
            Ok(match self.target {
                Target::Row(row) => page.rows[row].cells().join("\t"),
                Target::Cell(row, column) => page.rows[row]
                    .cells()
                    .get(column)
                    .cloned()
                    .unwrap_or_default(),
                Target::EditLink(_) => "Edit".to_string(),
                Target::Control(control) => match control {
                    dom::SORT_HEADER => "Year".to_string(),
                    dom::NEW => "New".to_string(),
                    dom::SAVE => "Save".to_string(),
                    dom::SUBMIT_ERROR => page.submit_error.clone().unwrap_or_default(),
                    _ => String::new(),
                },
            })
        })
    }

    fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.with_page(|page, _| {
            Ok(match (self.target, name) {
                (Target::Control(control), "value") if is_editable(control) || control == dom::ID => {
                    Some(page.input(control).to_string())
                }
                (Target::Control(control), "id") => Some(control.trim_start_matches(['#', '.']).to_string()),
                (Target::EditLink(row), "href") => Some(format!("#edit/{}", page.rows[row].id)),
                _ => None,
            })
        })
    }

    fn is_displayed(&self) -> DriverResult<bool> {
        self.with_page(|_, _| Ok(true))
    }

    fn click(&self) -> DriverResult<()> {
        self.with_page(|page, backend| {
            match self.target {
                Target::Control(dom::SORT_HEADER) => {
                    page.sort = Some(match page.sort {
                        Some(SortDirection::Ascending) => SortDirection::Descending,
                        _ => SortDirection::Ascending,
                    });
                    page.schedule_render(backend.timing.render_latency);
                }
                Target::Control(dom::NEW) => page.open_form(Form::New),
                Target::Control(dom::SAVE) => page.save(backend),
                Target::EditLink(row) => {
                    let id = page.rows[row].id;
                    page.open_form(Form::Edit(id));
                }
                _ => {}
            }
            Ok(())
        })
    }

    fn send_keys(&self, text: &str) -> DriverResult<()> {
        let Target::Control(control) = self.target else {
            return Err(self.not_editable());
        };
        if !is_editable(control) {
            return Err(self.not_editable());
        }
        self.with_page(|page, backend| {
            page.inputs.entry(control).or_default().push_str(text);
            if control == dom::FILTER {
                page.schedule_render(backend.timing.render_latency);
            }
            Ok(())
        })
    }

    fn clear(&self) -> DriverResult<()> {
        let Target::Control(control) = self.target else {
            return Err(self.not_editable());
        };
        if !is_editable(control) {
            return Err(self.not_editable());
        }
        self.with_page(|page, backend| {
            page.inputs.insert(control, String::new());
            if control == dom::FILTER {
                page.schedule_render(backend.timing.render_latency);
            }
            Ok(())
        })
    }

    fn find_all(&self, locator: &Locator) -> DriverResult<Vec<ElementRef>> {
        self.with_page(|_, _| {
            Ok(match (self.target, locator.selector()) {
                (Target::Row(row), dom::CELL) => (0..7).map(|column| self.child(Target::Cell(row, column))).collect(),
                (Target::Row(row), dom::EDIT_LINK) => vec![self.child(Target::EditLink(row))],
                _ => Vec::new(),
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn loaded(app: &SimulatedCarList) -> SimulatedBrowser {
        let mut browser = app.open_browser();
        browser.navigate("http://localhost:3000/").unwrap();
        browser
    }

    fn keys(browser: &SimulatedBrowser) -> Vec<String> {
        browser
            .find_all(&Locator::all(dom::ROWS))
            .unwrap()
            .iter()
            .map(|row| row.find_one(&Locator::one(dom::CELL)).unwrap().unwrap().text().unwrap())
            .collect()
    }

    fn type_into(browser: &SimulatedBrowser, field: &str, text: &str) {
        browser.require(&Locator::one(field)).unwrap().send_keys(text).unwrap();
    }

    mod fixture_tests {
        use super::*;

        #[test]
        fn test_fixture_has_five_records() {
            let records = fixture();
            assert_eq!(records.len(), 5);
            assert_eq!(records[0].cells()[0], "936");
            assert_eq!(records[2].cells()[1], "1996");
        }

        #[test]
        fn test_filter_matches_year_or_registration() {
            let matching: Vec<u32> = fixture()
                .iter()
                .filter(|record| record.matches_filter("2002"))
                .map(|record| record.id)
                .collect();
            assert_eq!(matching, vec![937, 938]);
        }

        #[test]
        fn test_reset_is_idempotent() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            app.reset().unwrap();
            let first = app.records();
            lock(&app.backend.records).pop();
            app.reset().unwrap();
            app.reset().unwrap();
            assert_eq!(app.records(), first);
            assert_eq!(app.resets(), 3);
        }
    }

    mod page_tests {
        use super::*;

        #[test]
        fn test_nothing_rendered_before_load() {
            let app = SimulatedCarList::with_timing(SimulationTiming {
                load_latency: Duration::from_secs(60),
                render_latency: Duration::ZERO,
            });
            let browser = loaded(&app);
            assert!(browser.find_all(&Locator::all(dom::ROWS)).unwrap().is_empty());
            assert!(browser.find_one(&Locator::one(dom::FILTER)).unwrap().is_none());
        }

        #[test]
        fn test_rows_render_after_load() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            assert_eq!(keys(&browser), vec!["936", "937", "938", "939", "940"]);
            assert!(browser.find_one(&Locator::one(dom::SAVE)).unwrap().is_none());
        }

        #[test]
        fn test_filter_and_clear() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            type_into(&browser, dom::FILTER, "2002");
            assert_eq!(keys(&browser), vec!["937", "938"]);

            browser.require(&Locator::one(dom::FILTER)).unwrap().clear().unwrap();
            assert_eq!(keys(&browser).len(), 5);
        }

        #[test]
        fn test_sort_toggles_direction() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            let header = Locator::one(dom::SORT_HEADER);

            browser.require(&header).unwrap().click().unwrap();
            assert_eq!(keys(&browser), vec!["938", "936", "937", "939", "940"]);

            browser.require(&header).unwrap().click().unwrap();
            assert_eq!(keys(&browser), vec!["940", "939", "937", "936", "938"]);
        }

        #[test]
        fn test_rows_go_stale_after_render() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            let row = browser.require(&Locator::one(dom::ROWS)).unwrap();
            type_into(&browser, dom::FILTER, "1997");
            let err = row.text().unwrap_err();
            assert_eq!(err.kind, DriverErrorKind::Stale);
        }

        #[test]
        fn test_render_waits_for_latency() {
            let app = SimulatedCarList::with_timing(SimulationTiming {
                load_latency: Duration::ZERO,
                render_latency: Duration::from_secs(60),
            });
            let browser = loaded(&app);
            type_into(&browser, dom::FILTER, "2002");
            assert_eq!(keys(&browser).len(), 5);
        }

        #[test]
        fn test_buttons_are_not_editable() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            let err = browser
                .require(&Locator::one(dom::NEW))
                .unwrap()
                .send_keys("x")
                .unwrap_err();
            assert_eq!(err.kind, DriverErrorKind::Unsupported);
        }
    }

    mod form_tests {
        use super::*;

        #[test]
        fn test_edit_round_trip() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            let rows = browser.find_all(&Locator::all(dom::ROWS)).unwrap();
            rows[2].find_one(&Locator::one(dom::EDIT_LINK)).unwrap().unwrap().click().unwrap();

            let id = browser.require(&Locator::one(dom::ID)).unwrap();
            assert_eq!(id.attribute("value").unwrap().as_deref(), Some("938"));
            assert!(id.send_keys("1").is_err());

            browser.require(&Locator::one(dom::DESCRIPTION)).unwrap().clear().unwrap();
            type_into(&browser, dom::DESCRIPTION, "Cool car");
            browser.require(&Locator::one(dom::SAVE)).unwrap().click().unwrap();

            let records = app.records();
            assert_eq!(records[2].description, "Cool car");
            assert_eq!(records[0], fixture()[0]);
            assert!(browser.find_one(&Locator::one(dom::SAVE)).unwrap().is_none());
        }

        #[test]
        fn test_save_requires_all_fields() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            browser.require(&Locator::one(dom::NEW)).unwrap().click().unwrap();
            browser.require(&Locator::one(dom::SAVE)).unwrap().click().unwrap();

            let err = browser.require(&Locator::one(dom::SUBMIT_ERROR)).unwrap();
            assert_eq!(err.text().unwrap(), dom::REQUIRED_MESSAGE);
            assert_eq!(app.records().len(), 5);
        }

        #[test]
        fn test_save_rejects_non_numeric_year() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            browser.require(&Locator::one(dom::NEW)).unwrap().click().unwrap();
            for field in FORM_FIELDS {
                type_into(&browser, field, "x");
            }
            browser.require(&Locator::one(dom::SAVE)).unwrap().click().unwrap();
            let err = browser.require(&Locator::one(dom::SUBMIT_ERROR)).unwrap();
            assert_eq!(err.text().unwrap(), NUMBER_MESSAGE);
        }

        #[test]
        fn test_create_appends_with_next_id() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let browser = loaded(&app);
            browser.require(&Locator::one(dom::NEW)).unwrap().click().unwrap();
            for (field, value) in FORM_FIELDS
                .iter()
                .zip(["2008", "2002-5-5", "Kia", "Rio", "As new", "31000"])
            {
                type_into(&browser, field, value);
            }
            browser.require(&Locator::one(dom::SAVE)).unwrap().click().unwrap();

            assert_eq!(keys(&browser).last().map(String::as_str), Some("941"));
            let created = app.records().pop().unwrap();
            assert_eq!(created.make, "Kia");
            assert_eq!(created.price, 31000);
        }
    }

    mod session_tests {
        use super::*;

        #[test]
        fn test_session_accounting() {
            let app = SimulatedCarList::new();
            let mut first = app.open().unwrap();
            let _second = app.open().unwrap();
            assert_eq!(app.open_sessions(), 2);
            first.close().unwrap();
            first.close().unwrap();
            assert_eq!(app.open_sessions(), 1);
            assert_eq!(app.sessions_opened(), 2);
        }

        #[test]
        fn test_closed_browser_rejects_everything() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let mut browser = loaded(&app);
            browser.close().unwrap();
            assert_eq!(
                browser.find_all(&Locator::all(dom::ROWS)).unwrap_err().kind,
                DriverErrorKind::Session
            );
            assert!(browser.navigate("http://localhost:3000/").is_err());
        }

        #[test]
        fn test_pages_are_independent() {
            let app = SimulatedCarList::with_timing(SimulationTiming::instant());
            let one = loaded(&app);
            let two = loaded(&app);
            type_into(&one, dom::FILTER, "2002");
            assert_eq!(keys(&one).len(), 2);
            assert_eq!(keys(&two).len(), 5);
        }
    }
}
