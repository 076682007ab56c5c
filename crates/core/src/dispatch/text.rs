//! Menu and prompt text shown by the dispatcher.

use crate::transport::{format_cost, format_duration, TripQuote};

pub(crate) const ENTRY_MENU: &str = "
Welcome to the delivery planner

Please pick from the following options:
1 - Login
2 - Register
3 - Help";

pub(crate) const HELP: &str = "
Delivery planner help

The application is driven from the command line. Options are listed as:

	1 - <option>
	2 - <another option>

Type the number of an option after the prompt and press enter, e.g.:

	> 1 (enter)

These keywords work at any prompt:

	exit   - quit the application
	logout - log out of the current account
	help   - show this text
	cancel - abandon the current action and return to the menu
";

pub(crate) const MAIN_MENU: &str = "Please select a function:

1 - Calculate Journey
";

pub(crate) const ADMIN_MAIN_MENU: &str = "2 - Manage Customers
3 - Manage Users";

pub(crate) const CUSTOMER_MENU: &str = "
Select Action:

1 - Add Customer
2 - Remove Customer
";

pub(crate) const USER_MENU: &str = "
Select Action:

1 - Remove User
2 - Change User Type
";

pub(crate) const ROLE_MENU: &str = "Select New Role:
1 - User
2 - Admin";

pub(crate) const PRESS_ENTER: &str = "Press enter to continue...";

pub(crate) const LOGIN_USERNAME: &str = "\nEnter username:";
pub(crate) const LOGIN_PASSWORD: &str = "\nEnter password:";
pub(crate) const REGISTER_USERNAME: &str = "\nPlease provide a username:";
pub(crate) const REGISTER_PASSWORD: &str = "\nPlease provide a password (1-50 characters):";

pub(crate) const CUSTOMER_NAME: &str = "\nPlease provide a customer name:";
pub(crate) const CUSTOMER_EXISTS: &str = "\nCustomer already exists, please try again:";
pub(crate) const CUSTOMER_NAME_EMPTY: &str = "\nCustomer name must not be empty, please try again:";
pub(crate) const NOT_A_NUMBER: &str =
    "\nError parsing value, please provide a single numerical value:";

pub(crate) const QUOTES_HEADER: &str =
    "Costs and durations for all available transport methods: \n";

pub(crate) fn coordinate_prompt(axis: char) -> String {
    format!("\nPlease provide customers grid {axis} coordinate:")
}

pub(crate) fn out_of_bounds(min: i64, max: i64) -> String {
    format!(
        "\nValue outside acceptable bounds, please provide a single numerical value between {min} and {max}:"
    )
}

pub(crate) fn retry_with(reason: impl std::fmt::Display) -> String {
    format!("\n{reason}, please try again:")
}

/// Render `items` as a 1-based numbered list, one entry per line.
pub(crate) fn numbered_list<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| format!("{} - {}\n", index + 1, item))
        .collect()
}

/// Render quotes as a boxed text table.
pub(crate) fn quote_table(quotes: &[TripQuote]) -> String {
    let header = ["TRANSPORT METHOD", "TIME TAKEN", "COST"];
    let rows: Vec<[String; 3]> = quotes
        .iter()
        .map(|quote| {
            [
                quote.method.to_string(),
                format_duration(quote.duration),
                format_cost(quote.cost),
            ]
        })
        .collect();

    let mut widths = header.map(|title| title.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths
        .iter()
        .fold(String::from("+"), |line, width| line + &"-".repeat(width + 2) + "+");
    let render_row = |cells: [&str; 3]| {
        cells
            .iter()
            .zip(widths)
            .fold(String::from("|"), |line, (cell, width)| {
                let padding = width - cell.chars().count();
                format!("{line} {cell}{} |", " ".repeat(padding))
            })
    };

    let mut lines = vec![border.clone(), render_row(header), border.clone()];
    for row in &rows {
        lines.push(render_row([row[0].as_str(), row[1].as_str(), row[2].as_str()]));
    }
    lines.push(border);
    lines.join("\n")
}
