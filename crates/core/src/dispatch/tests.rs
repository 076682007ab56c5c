use anyhow::Result;
use tempfile::{tempdir, TempDir};

use super::*;
use crate::{store::StoreError, terminal::scripted::ScriptedTerminal};

struct Harness {
    dispatcher: Dispatcher<ScriptedTerminal>,
    _dir: TempDir,
}

impl Harness {
    fn customer_names(&self) -> Vec<&str> {
        self.dispatcher
            .customers()
            .records()
            .iter()
            .map(|customer| customer.name.as_str())
            .collect()
    }

    fn prompts(&self) -> &[String] {
        &self.dispatcher.terminal().prompts
    }
}

fn account(username: &str, password: &str, role: Role) -> Result<User> {
    Ok(User {
        username: username.to_string(),
        password_hash: auth::hash_password(password)?,
        role,
    })
}

fn customer(name: &str, grid_x: i64, grid_y: i64) -> Customer {
    Customer {
        name: name.to_string(),
        grid_x,
        grid_y,
    }
}

/// Dispatcher with admin `amy`/`secret`, user `bob`/`hunter2` and two customers.
fn harness(inputs: &[&str]) -> Result<Harness> {
    let dir = tempdir()?;
    let mut config = AppConfig::default();
    config.users.file_path = dir.path().join("users.json");
    config.customers.file_path = dir.path().join("customers.json");

    let mut users = UserStore::open(&config.users.file_path)?;
    users.add(account("amy", "secret", Role::Admin)?)?;
    users.add(account("bob", "hunter2", Role::User)?)?;

    let mut customers = CustomerStore::open(&config.customers.file_path)?;
    customers.add(customer("Acme", 30, 40))?;
    customers.add(customer("Brindley", -10, 5))?;

    let terminal = ScriptedTerminal::new(inputs.iter().copied());
    Ok(Harness {
        dispatcher: Dispatcher::new(config, terminal, users, customers),
        _dir: dir,
    })
}

fn logged_in(username: &str, inputs: &[&str]) -> Result<Harness> {
    let mut harness = harness(inputs)?;
    let user = harness
        .dispatcher
        .users
        .find(username)
        .cloned()
        .expect("seeded user");
    harness.dispatcher.session.login(user);
    Ok(harness)
}

#[test]
fn admin_logs_in_and_requests_quotes() -> Result<()> {
    let mut h = harness(&["1", "amy", "secret", "1", "1", ""])?;
    h.dispatcher.handle()?;

    assert_eq!(
        h.dispatcher.session().state(),
        SessionState::AuthenticatedAdmin
    );
    let terminal = h.dispatcher.terminal();
    assert_eq!(terminal.sensitive_prompts, 1);
    assert_eq!(terminal.remaining(), 0);
    assert!(terminal.prompts[3].contains("3 - Manage Users"));
    assert!(terminal.prompts[4].contains("1 - Acme\n2 - Brindley\n"));

    let transcript = terminal.transcript();
    assert!(transcript.contains("Successfully logged in!"));
    assert!(transcript.contains("£94.17"));
    assert!(transcript.contains("| Canal boat       | 14:00:00"));
    assert!(transcript.contains("£135.83"));
    assert!(transcript.contains("£220.00"));
    Ok(())
}

#[test]
fn wrong_password_and_unknown_user_are_indistinguishable() -> Result<()> {
    for inputs in [["1", "amy", "wrong"], ["1", "nobody", "secret"]] {
        let mut h = harness(&inputs)?;
        let err = h.dispatcher.handle().unwrap_err();
        assert!(matches!(err, DispatchError::IncorrectCredentials));
        assert_eq!(
            h.dispatcher.session().state(),
            SessionState::Unauthenticated
        );
    }
    Ok(())
}

#[test]
fn registration_validates_then_asks_for_login() -> Result<()> {
    let mut h = harness(&["2", "", "cara", "", "correct horse"])?;
    let err = h.dispatcher.handle().unwrap_err();
    assert!(matches!(err, DispatchError::Restart));
    assert!(err.is_signal());
    assert_eq!(
        h.dispatcher.session().state(),
        SessionState::Unauthenticated
    );

    let cara = h.dispatcher.users().find("cara").expect("registered");
    assert_eq!(cara.role, Role::User);
    assert!(auth::verify_password("correct horse", &cara.password_hash));
    assert_eq!(UserStore::open(h.dispatcher.users().path())?.len(), 3);

    let prompts = h.prompts();
    assert!(prompts.contains(&"\nusername must not be empty, please try again:".to_string()));
    assert!(prompts
        .contains(&"\npassword must be between 1 and 50 characters, please try again:".to_string()));
    assert_eq!(h.dispatcher.terminal().sensitive_prompts, 2);
    Ok(())
}

#[test]
fn registering_a_taken_username_fails() -> Result<()> {
    let mut h = harness(&["2", "bob", "another"])?;
    let err = h.dispatcher.handle().unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Store(StoreError::AlreadyExists { kind: "user", .. })
    ));
    assert!(!err.is_signal());
    assert_eq!(h.dispatcher.users().len(), 2);
    Ok(())
}

#[test]
fn non_admin_cannot_reach_admin_menus() -> Result<()> {
    for option in ["2", "3"] {
        let mut h = logged_in("bob", &[option, "leftover"])?;
        h.dispatcher.handle()?;

        assert!(!h.prompts()[0].contains("Manage Customers"));
        assert_eq!(h.dispatcher.terminal().remaining(), 1);
        assert_eq!(h.dispatcher.terminal().clears, 0);
        assert_eq!(h.dispatcher.users().len(), 2);
        assert_eq!(h.dispatcher.customers().len(), 2);
        assert_eq!(
            h.dispatcher.session().state(),
            SessionState::AuthenticatedUser
        );
    }
    Ok(())
}

#[test]
fn add_customer_reprompts_each_field_until_valid() -> Result<()> {
    let mut h = logged_in(
        "amy",
        &["2", "1", "", "Acme", "Depot", "abc", "500", "12", "-3"],
    )?;
    h.dispatcher.handle()?;

    assert_eq!(
        h.dispatcher.customers().find("Depot"),
        Some(&customer("Depot", 12, -3))
    );
    assert_eq!(
        &h.prompts()[2..],
        [
            text::CUSTOMER_NAME.to_string(),
            text::CUSTOMER_NAME_EMPTY.to_string(),
            text::CUSTOMER_EXISTS.to_string(),
            text::coordinate_prompt('X'),
            text::NOT_A_NUMBER.to_string(),
            text::out_of_bounds(-100, 100),
            text::coordinate_prompt('Y'),
        ]
    );
    assert_eq!(
        CustomerStore::open(h.dispatcher.customers().path())?.len(),
        3
    );
    Ok(())
}

#[test]
fn cancel_abandons_customer_without_partial_record() -> Result<()> {
    let mut h = logged_in("amy", &["2", "1", "Depot", "12", "CANCEL"])?;
    let err = h.dispatcher.handle().unwrap_err();

    assert!(matches!(err, DispatchError::Escape));
    assert!(err.is_signal());
    assert_eq!(h.customer_names(), ["Acme", "Brindley"]);
    assert_eq!(
        h.dispatcher.session().state(),
        SessionState::AuthenticatedAdmin
    );
    assert!(h.dispatcher.terminal().output.is_empty());
    Ok(())
}

#[test]
fn logout_inside_a_flow_clears_the_session() -> Result<()> {
    let mut h = logged_in("amy", &["2", "1", "Depot", "logout"])?;
    let err = h.dispatcher.handle().unwrap_err();

    assert!(matches!(err, DispatchError::Escape));
    assert!(h.dispatcher.session().current_user().is_none());
    assert_eq!(h.dispatcher.customers().len(), 2);
    Ok(())
}

#[test]
fn help_inside_a_flow_shows_help_and_returns_to_menu() -> Result<()> {
    let mut h = logged_in("bob", &["1", "help", ""])?;
    let err = h.dispatcher.handle().unwrap_err();

    assert!(matches!(err, DispatchError::Escape));
    assert!(h.dispatcher.terminal().output.iter().any(|line| line == text::HELP));
    assert_eq!(h.dispatcher.terminal().remaining(), 0);
    assert!(h.dispatcher.session().current_user().is_some());
    Ok(())
}

#[test]
fn exit_keyword_propagates_from_nested_prompt() -> Result<()> {
    let mut h = logged_in("amy", &["3", "2", "exit"])?;
    let err = h.dispatcher.handle().unwrap_err();
    assert!(matches!(err, DispatchError::Exit));
    Ok(())
}

#[test]
fn removes_selected_customer() -> Result<()> {
    let mut h = logged_in("amy", &["2", "2", "1"])?;
    h.dispatcher.handle()?;

    assert_eq!(h.customer_names(), ["Brindley"]);
    let reopened = CustomerStore::open(h.dispatcher.customers().path())?;
    assert_eq!(reopened.records(), [customer("Brindley", -10, 5)]);
    Ok(())
}

#[test]
fn selection_bounds_follow_list_length() -> Result<()> {
    let cases: [(&str, fn(&DispatchError) -> bool); 4] = [
        ("3", |err| matches!(err, DispatchError::InvalidSelection)),
        ("0", |err| matches!(err, DispatchError::SelectionNotFound(0))),
        ("-2", |err| matches!(err, DispatchError::SelectionNotFound(-2))),
        ("two", |err| matches!(err, DispatchError::NotANumber { .. })),
    ];
    for (selection, expected) in cases {
        let mut h = logged_in("amy", &["2", "2", selection])?;
        let err = h.dispatcher.handle().unwrap_err();
        assert!(expected(&err), "{selection}: unexpected {err:?}");
        assert_eq!(h.dispatcher.customers().len(), 2);
    }
    Ok(())
}

#[test]
fn admin_cannot_remove_or_demote_themselves() -> Result<()> {
    let mut h = logged_in("amy", &["3", "1", "1"])?;
    let err = h.dispatcher.handle().unwrap_err();
    assert!(matches!(err, DispatchError::SelfDelete));
    assert_eq!(h.dispatcher.users().len(), 2);

    for role in ["1", "2"] {
        let mut h = logged_in("amy", &["3", "2", "1", role])?;
        let err = h.dispatcher.handle().unwrap_err();
        assert!(matches!(err, DispatchError::SelfRoleEdit));
        // rejected before the role menu is shown
        assert_eq!(h.dispatcher.terminal().remaining(), 1);
        assert_eq!(
            h.dispatcher.users().find("amy").map(|user| user.role),
            Some(Role::Admin)
        );
    }
    Ok(())
}

#[test]
fn admin_manages_other_users() -> Result<()> {
    let mut h = logged_in("amy", &["3", "2", "2", "2"])?;
    h.dispatcher.handle()?;
    assert_eq!(
        UserStore::open(h.dispatcher.users().path())?
            .find("bob")
            .map(|user| user.role),
        Some(Role::Admin)
    );

    let mut h = logged_in("amy", &["3", "2", "2", "9"])?;
    let err = h.dispatcher.handle().unwrap_err();
    assert!(matches!(err, DispatchError::UnrecognisedCommand(ref s) if s == "9"));
    assert_eq!(
        h.dispatcher.users().find("bob").map(|user| user.role),
        Some(Role::User)
    );

    let mut h = logged_in("amy", &["3", "1", "2"])?;
    h.dispatcher.handle()?;
    assert!(h.dispatcher.users().find("bob").is_none());
    assert_eq!(h.dispatcher.users().len(), 1);
    Ok(())
}

#[test]
fn run_reports_errors_and_keeps_going_until_exit() -> Result<()> {
    let mut h = harness(&["bogus", "1", "amy", "nope", "3", "", "exit"])?;
    h.dispatcher.run()?;

    let output = &h.dispatcher.terminal().output;
    assert!(output
        .iter()
        .any(|line| line == "session: unrecognised command: bogus"));
    assert!(output
        .iter()
        .any(|line| line.contains("username and password did not match")));
    assert!(output.iter().any(|line| line == text::HELP));
    Ok(())
}

#[test]
fn run_hides_control_signals() -> Result<()> {
    let mut h = harness(&[
        "2", "cara", "pw", "1", "cara", "pw", "1", "cancel", "exit",
    ])?;
    h.dispatcher.run()?;

    let output = &h.dispatcher.terminal().output;
    for signal in [DispatchError::Restart, DispatchError::Escape] {
        assert!(!output.contains(&signal.to_string()));
    }
    assert_eq!(
        h.dispatcher
            .session()
            .current_user()
            .map(|user| user.username.as_str()),
        Some("cara")
    );
    Ok(())
}

#[test]
fn run_stops_when_input_ends() -> Result<()> {
    let mut h = harness(&["1"])?;
    let err = h.dispatcher.run().unwrap_err();
    assert!(err.is_fatal());
    Ok(())
}

#[test]
fn cancel_at_password_prompt_abandons_login() -> Result<()> {
    let mut h = harness(&["1", "amy", "cancel"])?;
    let err = h.dispatcher.handle().unwrap_err();

    assert!(matches!(err, DispatchError::Escape));
    assert_eq!(h.dispatcher.terminal().sensitive_prompts, 1);
    assert_eq!(
        h.dispatcher.session().state(),
        SessionState::Unauthenticated
    );
    Ok(())
}

#[test]
fn logout_at_entry_menu_is_a_quiet_escape() -> Result<()> {
    let mut h = harness(&["logout", "exit"])?;
    let err = h.dispatcher.handle().unwrap_err();
    assert!(matches!(err, DispatchError::Escape));
    assert!(h.dispatcher.session().current_user().is_none());

    h.dispatcher.run()?;
    assert!(h.dispatcher.terminal().output.is_empty());
    Ok(())
}

#[test]
fn cancel_at_role_menu_keeps_role() -> Result<()> {
    let mut h = logged_in("amy", &["3", "2", "2", "cancel"])?;
    let err = h.dispatcher.handle().unwrap_err();

    assert!(matches!(err, DispatchError::Escape));
    assert_eq!(h.prompts().last().map(String::as_str), Some(text::ROLE_MENU));
    assert_eq!(
        UserStore::open(h.dispatcher.users().path())?
            .find("bob")
            .map(|user| user.role),
        Some(Role::User)
    );
    Ok(())
}

#[test]
fn keywords_work_at_the_pause_after_quotes() -> Result<()> {
    let mut h = logged_in("bob", &["1", "1", "exit"])?;
    let err = h.dispatcher.handle().unwrap_err();
    assert!(matches!(err, DispatchError::Exit));

    let mut h = logged_in("bob", &["1", "1", "logout"])?;
    let err = h.dispatcher.handle().unwrap_err();
    assert!(matches!(err, DispatchError::Escape));
    assert!(h.dispatcher.session().current_user().is_none());
    assert_eq!(
        h.prompts().last().map(String::as_str),
        Some(text::PRESS_ENTER)
    );
    Ok(())
}
