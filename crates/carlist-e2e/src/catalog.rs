//! Scenario catalog for the car list application.
//!
//! Each function returns a fresh [`Scenario`]; [`all`] is the regression
//! suite and [`extended`] adds checks that go beyond it.

use crate::condition::{CellText, Condition, Interaction, Probe};
use crate::locator::Locator;
use crate::scenario::{Scenario, Step};

/// The application's DOM contract
pub mod dom {
    /// Table body rows
    pub const ROWS: &str = "#tbodycars tr";
    /// Cells within a row
    pub const CELL: &str = "td";
    /// Edit link within a row
    pub const EDIT_LINK: &str = "a";
    /// The car table
    pub const TABLE: &str = ".table";
    /// Filter input
    pub const FILTER: &str = "#filter";
    /// Year column header; clicking sorts
    pub const SORT_HEADER: &str = "#h_year";
    /// Opens the empty form
    pub const NEW: &str = "#new";
    /// Submits the form
    pub const SAVE: &str = "#save";
    /// Read-only key field
    pub const ID: &str = "#id";
    /// Year field
    pub const YEAR: &str = "#year";
    /// Registration date field
    pub const REGISTERED: &str = "#registered";
    /// Make field
    pub const MAKE: &str = "#make";
    /// Model field
    pub const MODEL: &str = "#model";
    /// Description field
    pub const DESCRIPTION: &str = "#description";
    /// Price field
    pub const PRICE: &str = "#price";
    /// Form submission error
    pub const SUBMIT_ERROR: &str = "#submiterr";
    /// Text of [`SUBMIT_ERROR`] when a field is empty
    pub const REQUIRED_MESSAGE: &str = "All fields are required";

    /// Key column
    pub const KEY_COLUMN: usize = 0;
    /// Year column
    pub const YEAR_COLUMN: usize = 1;
    /// Registration date column
    pub const REGISTERED_COLUMN: usize = 2;
    /// Make column
    pub const MAKE_COLUMN: usize = 3;
    /// Model column
    pub const MODEL_COLUMN: usize = 4;
    /// Description column
    pub const DESCRIPTION_COLUMN: usize = 5;
    /// Price column
    pub const PRICE_COLUMN: usize = 6;
}

/// Rows in the fixture
pub const FIXTURE_ROWS: usize = 5;

/// Cell texts of the fixture rows after a reset, in table order
pub const FIXTURE_CELLS: [[&str; 7]; FIXTURE_ROWS] = [
    ["936", "1997", "1999-1-1", "Ford", "E350", "ac, abs, moon", "3000"],
    ["937", "1999", "2002-5-1", "Chevy", "Venture", "None", "4900"],
    ["938", "1996", "2002-5-8", "Jeep", "Grand Cherokee", "Moon roof", "4799"],
    ["939", "2001", "2000-1-4", "Volvo", "V70", "Sport", "44799"],
    ["940", "2005", "2005-1-9", "Audi", "A4", "Diesel", "25000"],
];

/// Timeout of the page-load check
const LOAD_TIMEOUT_MS: u64 = 2_000;

fn rows() -> Locator {
    Locator::all(dom::ROWS)
}

fn row_count(expected: usize) -> Probe {
    Probe::count(rows(), expected)
}

/// Every fixture cell still shows its reset value, except `column` of row `key`
fn fixture_intact_except(key: &str, column: usize) -> Probe {
    let mut probes = Vec::new();
    for cells in &FIXTURE_CELLS {
        for (index, text) in cells.iter().enumerate().skip(dom::KEY_COLUMN + 1) {
            if cells[dom::KEY_COLUMN] == key && index == column {
                continue;
            }
            probes.push(Probe::row_showing(
                rows(),
                CellText::key(cells[dom::KEY_COLUMN]),
                CellText::new(index, *text),
            ));
        }
    }
    Probe::all(probes)
}

/// The fixture renders five rows
#[must_use]
pub fn initial_load() -> Scenario {
    Scenario::new("initial_load")
        .describe("after a reset the table shows the five fixture rows")
        .step(Step::navigate_root())
        .step(Step::wait_within(row_count(FIXTURE_ROWS), LOAD_TIMEOUT_MS))
}

/// Filtering on "2002" leaves two rows; clearing restores five
#[must_use]
pub fn filter() -> Scenario {
    Scenario::new("filter")
        .describe("typing 2002 into the filter leaves rows 937 and 938; clearing it restores all rows")
        .step(Step::navigate_root())
        .step(Step::wait(Probe::visible(dom::FILTER)))
        .step(Step::wait(
            Condition::new(Probe::present(dom::FILTER)).then(Interaction::type_text("2002")),
        ))
        .step(Step::wait(row_count(2)))
        .step(Step::clear(dom::FILTER))
        .step(Step::wait(row_count(FIXTURE_ROWS)))
}

/// Sorting by year puts 938 first and 940 last
#[must_use]
pub fn sort() -> Scenario {
    Scenario::new("sort")
        .describe("clicking the year header sorts ascending by year")
        .step(Step::navigate_root())
        .step(Step::wait(
            Condition::new(Probe::present(dom::SORT_HEADER)).then(Interaction::Click),
        ))
        .step(Step::wait(Probe::first_and_last(rows(), "938", "940")))
}

/// Editing 938's description shows in its row
#[must_use]
pub fn edit() -> Scenario {
    Scenario::new("edit")
        .describe("changing the description of car 938 updates its row and no other")
        .step(Step::navigate_root())
        .step(Step::wait(
            Condition::new(Probe::row(rows(), CellText::key("938")))
                .then(Interaction::click_within(dom::EDIT_LINK)),
        ))
        .step(Step::wait(Probe::attribute(dom::ID, "value", "938")))
        .step(Step::clear(dom::DESCRIPTION))
        .step(Step::type_into(dom::DESCRIPTION, "Cool car"))
        .step(Step::click(dom::SAVE))
        .step(Step::wait(Probe::row_showing(
            rows(),
            CellText::key("938"),
            CellText::new(dom::DESCRIPTION_COLUMN, "Cool car"),
        )))
        .step(Step::wait(fixture_intact_except("938", dom::DESCRIPTION_COLUMN)))
}

/// Saving an empty form is rejected
#[must_use]
pub fn save_validation_error() -> Scenario {
    Scenario::new("save_validation_error")
        .describe("saving an empty form shows the required-fields error and adds nothing")
        .step(Step::navigate_root())
        .step(Step::wait(Probe::present(dom::NEW)))
        .step(Step::click(dom::NEW))
        .step(Step::click(dom::SAVE))
        .step(Step::wait(Probe::text(dom::SUBMIT_ERROR, dom::REQUIRED_MESSAGE)))
        .step(Step::wait(row_count(FIXTURE_ROWS)))
}

/// Creating a car appends a sixth row
#[must_use]
pub fn create_new() -> Scenario {
    let created = |column: usize, text: &str| {
        Probe::row_showing(
            rows(),
            CellText::new(dom::DESCRIPTION_COLUMN, "As new"),
            CellText::new(column, text),
        )
    };
    Scenario::new("create_new")
        .describe("a complete form creates a sixth row with the entered values")
        .step(Step::navigate_root())
        .step(Step::wait(
            Condition::new(Probe::present(dom::NEW)).then(Interaction::Click),
        ))
        .step(Step::type_into(dom::YEAR, "2008"))
        .step(Step::type_into(dom::REGISTERED, "2002-5-5"))
        .step(Step::type_into(dom::MAKE, "Kia"))
        .step(Step::type_into(dom::MODEL, "Rio"))
        .step(Step::type_into(dom::DESCRIPTION, "As new"))
        .step(Step::type_into(dom::PRICE, "31000"))
        .step(Step::click(dom::SAVE))
        .step(Step::wait(row_count(FIXTURE_ROWS + 1)))
        .step(Step::wait(Probe::all(vec![
            created(dom::YEAR_COLUMN, "2008"),
            created(dom::MAKE_COLUMN, "Kia"),
            created(dom::MODEL_COLUMN, "Rio"),
        ])))
}

/// A second click on the year header reverses the order
#[must_use]
pub fn sort_toggle() -> Scenario {
    Scenario::new("sort_toggle")
        .describe("clicking the year header twice sorts descending")
        .step(Step::navigate_root())
        .step(Step::wait(
            Condition::new(Probe::present(dom::SORT_HEADER)).then(Interaction::Click),
        ))
        .step(Step::wait(Probe::first_and_last(rows(), "938", "940")))
        .step(Step::click(dom::SORT_HEADER))
        .step(Step::wait(Probe::first_and_last(rows(), "940", "938")))
}

/// The regression suite
#[must_use]
pub fn all() -> Vec<Scenario> {
    vec![
        initial_load(),
        filter(),
        sort(),
        edit(),
        save_validation_error(),
        create_new(),
    ]
}

/// The regression suite plus extra checks
#[must_use]
pub fn extended() -> Vec<Scenario> {
    let mut scenarios = all();
    scenarios.push(sort_toggle());
    scenarios
}

/// Look up a scenario of [`extended`] by exact name
#[must_use]
pub fn by_name(name: &str) -> Option<Scenario> {
    extended().into_iter().find(|scenario| scenario.name == name)
}
