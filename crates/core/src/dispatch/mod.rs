//! Interactive menu state machine driving a [`Terminal`].
//!
//! Each call to [`Dispatcher::handle`] reads one menu selection and runs the
//! chosen action to completion, prompting for further input as needed.
//! Keywords typed at any prompt are turned into control signals that unwind
//! back to [`Dispatcher::run`].

mod error;
mod input;
mod session;
mod text;

#[cfg(test)]
mod tests;

use tracing::{debug, error, info, warn};

use crate::{
    auth,
    config::AppConfig,
    models::{Customer, Role, User},
    store::{CustomerStore, UserStore},
    terminal::Terminal,
    transport,
};

pub use error::DispatchError;
pub use input::{classify_input, Input, Keyword};
pub use session::{Session, SessionState};

/// Whether typed characters are shown while reading a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Echo {
    Visible,
    Hidden,
}

/// Owns the session and routes terminal input to menu handlers.
pub struct Dispatcher<T> {
    config: AppConfig,
    terminal: T,
    users: UserStore,
    customers: CustomerStore,
    session: Session,
}

impl<T: Terminal> Dispatcher<T> {
    /// Build a dispatcher with nobody logged in.
    pub fn new(config: AppConfig, terminal: T, users: UserStore, customers: CustomerStore) -> Self {
        Self {
            config,
            terminal,
            users,
            customers,
            session: Session::default(),
        }
    }

    /// Current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Account store.
    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// Customer roster.
    pub fn customers(&self) -> &CustomerStore {
        &self.customers
    }

    /// Terminal the dispatcher reads from.
    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    /// Run iterations until the user exits or input ends.
    ///
    /// Failures of a single iteration are logged and reported on the terminal;
    /// control signals are swallowed. Only running out of input is returned.
    pub fn run(&mut self) -> Result<(), DispatchError> {
        loop {
            match self.handle() {
                Ok(()) => {}
                Err(DispatchError::Exit) => {
                    info!("exit requested");
                    return Ok(());
                }
                Err(err) if err.is_signal() => debug!(%err, "control signal"),
                Err(err) if err.is_fatal() => {
                    error!(%err, "terminal input closed");
                    return Err(err);
                }
                Err(err) => {
                    warn!(%err, "command failed");
                    self.terminal.write_line(&err.to_string());
                }
            }
        }
    }

    /// Read one menu selection for the current session state and act on it.
    pub fn handle(&mut self) -> Result<(), DispatchError> {
        match self.session.state() {
            SessionState::Unauthenticated => self.entry_menu(),
            SessionState::AuthenticatedUser | SessionState::AuthenticatedAdmin => self.main_menu(),
        }
    }

    fn entry_menu(&mut self) -> Result<(), DispatchError> {
        let selection = self.read_value(text::ENTRY_MENU)?;
        match selection.as_str() {
            "1" => {
                self.terminal.clear_screen();
                self.terminal.write_line("Login");
                self.login()?;
                self.terminal.clear_screen();
                self.main_menu()
            }
            "2" => {
                self.terminal.clear_screen();
                self.terminal.write_line("Register Account");
                self.register()
            }
            "3" => {
                self.terminal.clear_screen();
                self.show_help()
            }
            _ => {
                self.terminal.clear_screen();
                Err(DispatchError::UnrecognisedCommand(selection))
            }
        }
    }

    fn main_menu(&mut self) -> Result<(), DispatchError> {
        let is_admin = self.session.is_admin();
        let mut prompt = text::MAIN_MENU.to_string();
        if is_admin {
            prompt.push_str(text::ADMIN_MAIN_MENU);
        }

        let selection = self.read_value(&prompt)?;
        match selection.as_str() {
            "1" => self.calculate_delivery(),
            "2" if is_admin => self.manage_customers(),
            "3" if is_admin => self.manage_users(),
            "2" | "3" => {
                debug!(selection = %selection, "admin option ignored for non-admin");
                Ok(())
            }
            _ => {
                self.terminal.clear_screen();
                Err(DispatchError::UnrecognisedCommand(selection))
            }
        }
    }

    fn login(&mut self) -> Result<(), DispatchError> {
        let username = self.read_value(text::LOGIN_USERNAME)?;
        let password = self.read_sensitive(text::LOGIN_PASSWORD)?;

        let user = match self.users.find(&username) {
            Some(user) if auth::verify_password(&password, &user.password_hash) => user.clone(),
            found => {
                warn!(username = %username, known = found.is_some(), "login rejected");
                return Err(DispatchError::IncorrectCredentials);
            }
        };

        info!(username = %user.username, role = %user.role, "logged in");
        self.session.login(user);
        self.terminal.write_line("Successfully logged in!");
        Ok(())
    }

    fn register(&mut self) -> Result<(), DispatchError> {
        let username = self.read_validated(text::REGISTER_USERNAME, Echo::Visible, |_, value| {
            auth::validate_username(value)
                .map(|()| value.to_string())
                .map_err(text::retry_with)
        })?;
        let password = self.read_validated(text::REGISTER_PASSWORD, Echo::Hidden, |_, value| {
            auth::validate_password(value)
                .map(|()| value.to_string())
                .map_err(text::retry_with)
        })?;

        let password_hash = auth::hash_password(&password)?;
        self.users.add(User {
            username: username.clone(),
            password_hash,
            role: Role::User,
        })?;

        info!(username = %username, "account registered");
        self.terminal
            .write_line("Successfully created new account, please login to continue");
        Err(DispatchError::Restart)
    }

    fn calculate_delivery(&mut self) -> Result<(), DispatchError> {
        self.terminal.clear_screen();
        let customer = self.select_customer()?;

        let quotes = transport::compute_quotes(
            &customer,
            self.config.company.origin(),
            &self.config.vehicles,
        );
        debug!(customer = %customer.name, ?quotes, "quotes computed");

        self.terminal.write_line(text::QUOTES_HEADER);
        self.terminal.write_line(&text::quote_table(&quotes));
        self.pause()?;
        self.terminal.clear_screen();
        Ok(())
    }

    fn manage_customers(&mut self) -> Result<(), DispatchError> {
        self.terminal.clear_screen();
        let selection = self.read_value(text::CUSTOMER_MENU)?;
        match selection.as_str() {
            "1" => {
                let customer = self.read_new_customer()?;
                let name = customer.name.clone();
                self.customers.add(customer)?;
                self.terminal.write_line(&format!("Added customer {name}"));
                Ok(())
            }
            "2" => {
                let customer = self.select_customer()?;
                self.customers.remove(&customer)?;
                self.terminal
                    .write_line(&format!("Removed customer {}", customer.name));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn manage_users(&mut self) -> Result<(), DispatchError> {
        self.terminal.clear_screen();
        let selection = self.read_value(text::USER_MENU)?;
        match selection.as_str() {
            "1" => {
                let user = self.select_user()?;
                self.reject_self_action(&user, DispatchError::SelfDelete)?;
                self.users.remove(&user)?;
                self.terminal
                    .write_line(&format!("Removed user {}", user.username));
                Ok(())
            }
            "2" => {
                let user = self.select_user()?;
                self.reject_self_action(&user, DispatchError::SelfRoleEdit)?;
                let role = self.select_role()?;
                self.users.set_role(&user, role)?;
                self.terminal
                    .write_line(&format!("{} is now {role}", user.username));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn reject_self_action(&self, user: &User, rejection: DispatchError) -> Result<(), DispatchError> {
        if self.session.is_current(&user.username) {
            warn!(username = %user.username, %rejection, "self action rejected");
            return Err(rejection);
        }
        Ok(())
    }

    fn read_new_customer(&mut self) -> Result<Customer, DispatchError> {
        let name = self.read_validated(text::CUSTOMER_NAME, Echo::Visible, |this, value| {
            if value.trim().is_empty() {
                Err(text::CUSTOMER_NAME_EMPTY.to_string())
            } else if this.customers.find(value).is_some() {
                Err(text::CUSTOMER_EXISTS.to_string())
            } else {
                Ok(value.to_string())
            }
        })?;
        let limits = self.config.grid_limits;
        let grid_x = self.read_coordinate('X', limits.min_x, limits.max_x)?;
        let grid_y = self.read_coordinate('Y', limits.min_y, limits.max_y)?;
        Ok(Customer {
            name,
            grid_x,
            grid_y,
        })
    }

    fn read_coordinate(&mut self, axis: char, min: i64, max: i64) -> Result<i64, DispatchError> {
        let prompt = text::coordinate_prompt(axis);
        self.read_validated(&prompt, Echo::Visible, |_, value| {
            match value.parse::<i64>() {
                Err(_) => Err(text::NOT_A_NUMBER.to_string()),
                Ok(coordinate) if coordinate < min || coordinate > max => {
                    Err(text::out_of_bounds(min, max))
                }
                Ok(coordinate) => Ok(coordinate),
            }
        })
    }

    fn select_customer(&mut self) -> Result<Customer, DispatchError> {
        self.terminal.write_line("Select Customer:\n");
        let listing = text::numbered_list(self.customers.records().iter().map(|c| &c.name));
        let index = self.read_index(&listing, self.customers.len())?;
        Ok(self.customers.records()[index].clone())
    }

    fn select_user(&mut self) -> Result<User, DispatchError> {
        self.terminal.write_line("Select User (username (role)):\n");
        let listing = text::numbered_list(
            self.users
                .records()
                .iter()
                .map(|user| format!("{} ({})", user.username, user.role)),
        );
        let index = self.read_index(&listing, self.users.len())?;
        Ok(self.users.records()[index].clone())
    }

    fn select_role(&mut self) -> Result<Role, DispatchError> {
        let selection = self.read_value(text::ROLE_MENU)?;
        match selection.as_str() {
            "1" => Ok(Role::User),
            "2" => Ok(Role::Admin),
            _ => Err(DispatchError::UnrecognisedCommand(selection)),
        }
    }

    /// Read a 1-based list index and return it 0-based.
    ///
    /// Only indices past the end count as an invalid selection; zero and
    /// negative numbers are reported as not found.
    fn read_index(&mut self, listing: &str, len: usize) -> Result<usize, DispatchError> {
        let selection = self.read_value(listing)?;
        let index: i64 = match selection.parse() {
            Ok(index) => index,
            Err(source) => {
                return Err(DispatchError::NotANumber {
                    input: selection,
                    source,
                })
            }
        };
        if index > len as i64 {
            return Err(DispatchError::InvalidSelection);
        }
        usize::try_from(index - 1).map_err(|_| DispatchError::SelectionNotFound(index))
    }

    /// Prompt until `parse` accepts the input. A rejection supplies the next prompt.
    fn read_validated<V, F>(
        &mut self,
        prompt: &str,
        echo: Echo,
        mut parse: F,
    ) -> Result<V, DispatchError>
    where
        F: FnMut(&Self, &str) -> Result<V, String>,
    {
        let mut prompt = prompt.to_string();
        loop {
            let value = match echo {
                Echo::Visible => self.read_value(&prompt)?,
                Echo::Hidden => self.read_sensitive(&prompt)?,
            };
            match parse(self, &value) {
                Ok(parsed) => return Ok(parsed),
                Err(retry) => prompt = retry,
            }
        }
    }

    fn read_value(&mut self, prompt: &str) -> Result<String, DispatchError> {
        let raw = self.terminal.prompt_line(prompt)?;
        self.intercept(classify_input(&raw))
    }

    fn read_sensitive(&mut self, prompt: &str) -> Result<String, DispatchError> {
        let raw = self.terminal.prompt_sensitive(prompt)?;
        self.intercept(classify_input(&raw))
    }

    /// Pass values through; act on keywords and abort the current flow.
    fn intercept(&mut self, input: Input) -> Result<String, DispatchError> {
        let keyword = match input {
            Input::Value(value) => return Ok(value),
            Input::Keyword(keyword) => keyword,
        };
        debug!(?keyword, "keyword interrupt");
        match keyword {
            Keyword::Exit => return Err(DispatchError::Exit),
            Keyword::Logout => {
                if let Some(user) = self.session.logout() {
                    info!(username = %user.username, "logged out");
                }
            }
            Keyword::Help => self.show_help()?,
            Keyword::Cancel => {}
        }
        Err(DispatchError::Escape)
    }

    fn show_help(&mut self) -> Result<(), DispatchError> {
        self.terminal.write_line(text::HELP);
        self.pause()
    }

    fn pause(&mut self) -> Result<(), DispatchError> {
        self.read_value(text::PRESS_ENTER)?;
        Ok(())
    }
}
