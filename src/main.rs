//! Fjord Memo entry point
//!
//! On the web, wires DOM events to the app and renders the list. Natively,
//! runs a small command-line front end over a JSON file store.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlInputElement, KeyboardEvent};

    use fjord_memo::persistence::{KeyValueStore, MemoryStorage};
    use fjord_memo::platform::{LocalStorage, clear_fragment, current_fragment};
    use fjord_memo::route::fragment_for;
    use fjord_memo::{Action, App, EditOutcome, Settings, TodoId, TodoItem, Visibility};

    type SharedApp = Rc<RefCell<App<Box<dyn KeyValueStore>>>>;

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let settings = Settings::default();
        let level = settings.log_level.to_level().unwrap_or(log::Level::Info);
        console_log::init_with_level(level).expect("Failed to init logger");

        log::info!("Fjord Memo starting...");

        let backend: Box<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(storage) => Box::new(storage),
            Err(err) => {
                log::warn!("{}; todos will be kept in memory only", err);
                Box::new(MemoryStorage::new())
            }
        };
        let app: SharedApp = Rc::new(RefCell::new(App::new(backend, &settings)));
        if let Some(warning) = app.borrow_mut().take_warning() {
            show_warning(&warning.to_string());
        }

        setup_hash_change(app.clone());
        setup_new_todo(app.clone());
        setup_archive_button(app.clone());
        setup_list_events(app.clone());

        apply_fragment(&app);
    }

    /// Run an action and re-render if the view changed
    fn dispatch(app: &SharedApp, action: Action) {
        // Drafts live in the focused input; rebuilding it would drop the caret
        let rerender = !matches!(action, Action::UpdateDraft(..));
        let changed = {
            // Busy means a handler fired re-entrantly during render
            let Ok(mut guard) = app.try_borrow_mut() else {
                return;
            };
            let changed = guard.dispatch(action);
            if let Some(warning) = guard.take_warning() {
                show_warning(&warning.to_string());
            }
            changed
        };
        if changed && rerender {
            render(app);
        }
    }

    fn apply_fragment(app: &SharedApp) {
        let route = {
            let Ok(mut guard) = app.try_borrow_mut() else {
                return;
            };
            guard.on_fragment_change(&current_fragment())
        };
        if route.clear_fragment {
            clear_fragment();
        }
        render(app);
    }

    /// Confirm an edit on focus loss by patching its row only
    ///
    /// Rebuilding the list here would replace the element under a pending
    /// click on another row.
    fn confirm_in_place(app: &SharedApp, edit_input: &Element, id: TodoId) {
        let (outcome, title, summary) = {
            let Ok(mut guard) = app.try_borrow_mut() else {
                return;
            };
            let outcome = guard.confirm_edit(id);
            if let Some(warning) = guard.take_warning() {
                show_warning(&warning.to_string());
            }
            let title = guard.store().get(id).map(|todo| todo.title.clone());
            (outcome, title, guard.summary())
        };
        let Ok(Some(row)) = edit_input.closest("li[data-id]") else {
            return;
        };
        match outcome {
            EditOutcome::Ignored => return,
            EditOutcome::Saved => {
                if let Ok(Some(label)) = row.query_selector("label") {
                    label.set_text_content(title.as_deref());
                }
                let _ = row.class_list().remove_1("editing");
                edit_input.remove();
            }
            EditOutcome::Removed => row.remove(),
        }
        if let Some(el) = document().and_then(|d| d.get_element_by_id("todo-summary")) {
            el.set_text_content(Some(&summary.to_string()));
        }
    }

    fn show_warning(message: &str) {
        let Some(el) = document().and_then(|d| d.get_element_by_id("storage-warning")) else {
            return;
        };
        el.set_text_content(Some(message));
        let _ = el.class_list().remove_1("hidden");
    }

    fn render(app: &SharedApp) {
        let Ok(app) = app.try_borrow() else {
            return;
        };
        let Some(document) = document() else {
            return;
        };

        if let Some(el) = document.get_element_by_id("todo-summary") {
            el.set_text_content(Some(&app.summary().to_string()));
        }

        for visibility in Visibility::VARIANTS {
            let id = format!("filter-{}", visibility.as_str());
            if let Some(link) = document.get_element_by_id(&id) {
                let _ = link.set_attribute("href", &fragment_for(visibility));
                let _ = link
                    .class_list()
                    .toggle_with_force("active", visibility == app.visibility());
            }
        }

        let Some(list) = document.get_element_by_id("todo-list") else {
            return;
        };
        list.set_text_content(None);

        let editing = app.store().editing();
        for todo in app.visible_todos() {
            let is_editing = editing == Some(todo.id);
            match render_item(&document, todo, is_editing) {
                Ok((li, edit_input)) => {
                    if let Err(err) = list.append_child(&li) {
                        log::warn!("Failed to attach todo {}: {:?}", todo.id, err);
                        continue;
                    }
                    if let Some(input) = edit_input {
                        let _ = input.focus();
                    }
                }
                Err(err) => log::warn!("Failed to render todo {}: {:?}", todo.id, err),
            }
        }
    }

    fn render_item(
        document: &Document,
        todo: &TodoItem,
        is_editing: bool,
    ) -> Result<(Element, Option<HtmlInputElement>), JsValue> {
        let li = document.create_element("li")?;
        li.set_attribute("data-id", &todo.id.to_string())?;
        li.class_list().toggle_with_force("completed", todo.done)?;
        li.class_list().toggle_with_force("editing", is_editing)?;

        let view = document.create_element("div")?;
        view.set_class_name("view");

        let toggle: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        toggle.set_type("checkbox");
        toggle.set_class_name("toggle");
        toggle.set_checked(todo.done);
        view.append_child(&toggle)?;

        let label = document.create_element("label")?;
        label.set_text_content(Some(&todo.title));
        if todo.done {
            label.set_class_name("done");
        }
        view.append_child(&label)?;

        let destroy = document.create_element("button")?;
        destroy.set_class_name("btn btn-warning btn-sm destroy");
        destroy.set_text_content(Some("削除"));
        view.append_child(&destroy)?;
        li.append_child(&view)?;

        let edit_input = if is_editing {
            let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
            input.set_type("text");
            input.set_class_name("edit");
            input.set_value(&todo.title);
            li.append_child(&input)?;
            Some(input)
        } else {
            None
        };

        Ok((li, edit_input))
    }

    /// Todo id of the list row containing `target`
    fn row_id(target: &Element) -> Option<TodoId> {
        let row = target.closest("li[data-id]").ok()??;
        row.get_attribute("data-id")?.parse().ok().map(TodoId)
    }

    fn event_element(event: &web_sys::Event) -> Option<Element> {
        event.target()?.dyn_into::<Element>().ok()
    }

    fn setup_hash_change(app: SharedApp) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            apply_fragment(&app);
        });
        let _ = window.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_new_todo(app: SharedApp) {
        let Some(document) = document() else {
            return;
        };
        let Some(input) = document
            .get_element_by_id("new-todo")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            log::warn!("No #new-todo input found");
            return;
        };

        let submit = {
            let input = input.clone();
            Rc::new(move |app: &SharedApp| {
                let title = input.value();
                input.set_value("");
                dispatch(app, Action::Add(title));
            })
        };

        // Enter in the input
        {
            let app = app.clone();
            let submit = submit.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Enter" {
                    submit(&app);
                }
            });
            let _ = input.add_event_listener_with_callback("keypress", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Add button
        if let Some(btn) = document.get_element_by_id("add-todo") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                submit(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_archive_button(app: SharedApp) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id("archive-btn")) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            dispatch(&app, Action::ArchiveCompleted);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Delegated handlers on the list element
    fn setup_list_events(app: SharedApp) {
        let Some(list) = document().and_then(|d| d.get_element_by_id("todo-list")) else {
            log::warn!("No #todo-list element found");
            return;
        };

        let listen = |event_name: &str, handler: Box<dyn FnMut(web_sys::Event)>| {
            let closure = Closure::wrap(handler);
            let _ = list.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        };

        {
            let app = app.clone();
            listen(
                "click",
                Box::new(move |event| {
                    let Some(target) = event_element(&event) else {
                        return;
                    };
                    let Some(id) = row_id(&target) else {
                        return;
                    };
                    let classes = target.class_list();
                    if classes.contains("toggle") {
                        dispatch(&app, Action::ToggleDone(id));
                    } else if classes.contains("destroy") {
                        dispatch(&app, Action::Delete(id));
                    }
                }),
            );
        }

        {
            let app = app.clone();
            listen(
                "dblclick",
                Box::new(move |event| {
                    let Some(target) = event_element(&event) else {
                        return;
                    };
                    if target.tag_name() == "LABEL" {
                        if let Some(id) = row_id(&target) {
                            dispatch(&app, Action::BeginEdit(id));
                        }
                    }
                }),
            );
        }

        {
            let app = app.clone();
            listen(
                "input",
                Box::new(move |event| {
                    let Some(input) = event
                        .target()
                        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    else {
                        return;
                    };
                    if input.class_list().contains("edit") {
                        if let Some(id) = row_id(&input) {
                            dispatch(&app, Action::UpdateDraft(id, input.value()));
                        }
                    }
                }),
            );
        }

        {
            let app = app.clone();
            listen(
                "keyup",
                Box::new(move |event| {
                    let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    let Some(target) = event_element(&event) else {
                        return;
                    };
                    let Some(id) = row_id(&target) else {
                        return;
                    };
                    match key_event.key().as_str() {
                        "Enter" => dispatch(&app, Action::ConfirmEdit(id)),
                        "Escape" => dispatch(&app, Action::CancelEdit(id)),
                        _ => {}
                    }
                }),
            );
        }

        // blur does not bubble; focusout does
        listen(
            "focusout",
            Box::new(move |event| {
                let Some(target) = event_element(&event) else {
                    return;
                };
                if target.class_list().contains("edit") {
                    if let Some(id) = row_id(&target) {
                        confirm_in_place(&app, &target, id);
                    }
                }
            }),
        );
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::{ArgAction, Parser, Subcommand};
    use log::LevelFilter;

    use fjord_memo::platform::FileStorage;
    use fjord_memo::{Action, App, Settings, TodoId};

    #[derive(Parser, Debug)]
    #[command(name = "fjord-memo", version, about = "A small to-do list")]
    struct Cli {
        /// Directory holding the saved list
        #[arg(long, default_value = ".fjord-memo")]
        data_dir: PathBuf,

        /// Storage key (file name) of the list
        #[arg(long)]
        key: Option<String>,

        /// Increase log verbosity (-v info, -vv debug)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Add a todo
        Add {
            #[arg(required = true)]
            title: Vec<String>,
        },
        /// List todos, optionally filtered (`all`, `active`, `completed`, or `#/active`)
        List { filter: Option<String> },
        /// Flip a todo between active and completed
        Toggle { id: u64 },
        /// Replace a todo's title; a blank title deletes it
        Edit { id: u64, title: Vec<String> },
        /// Delete a todo
        Rm { id: u64 },
        /// Delete every completed todo
        Archive,
    }

    pub fn run() -> ExitCode {
        let cli = Cli::parse();

        let level = match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        };
        let mut settings = Settings::default().with_log_level(level);
        if let Some(key) = cli.key {
            settings = settings.with_storage_key(key);
        }
        env_logger::Builder::new()
            .filter_level(settings.log_level)
            .parse_default_env()
            .init();

        let mut app = App::new(FileStorage::new(&cli.data_dir), &settings);
        let ok = match cli.command {
            Command::Add { title } => app.dispatch(Action::Add(title.join(" "))),
            Command::List { filter } => {
                if let Some(filter) = filter {
                    if app.on_fragment_change(&filter).clear_fragment {
                        eprintln!("unknown filter `{}`, showing all", filter);
                    }
                }
                print_list(&app);
                true
            }
            Command::Toggle { id } => app.dispatch(Action::ToggleDone(TodoId(id))),
            Command::Edit { id, title } => {
                let id = TodoId(id);
                app.dispatch(Action::BeginEdit(id))
                    && app.dispatch(Action::UpdateDraft(id, title.join(" ")))
                    && app.dispatch(Action::ConfirmEdit(id))
            }
            Command::Rm { id } => app.dispatch(Action::Delete(TodoId(id))),
            Command::Archive => {
                app.dispatch(Action::ArchiveCompleted);
                true
            }
        };

        if let Some(warning) = app.take_warning() {
            eprintln!("warning: {}", warning);
        }
        if ok {
            ExitCode::SUCCESS
        } else {
            eprintln!("nothing changed (blank title or unknown id)");
            ExitCode::FAILURE
        }
    }

    fn print_list<S: fjord_memo::KeyValueStore>(app: &App<S>) {
        for todo in app.visible_todos() {
            let mark = if todo.done { 'x' } else { ' ' };
            println!("{:>4} [{}] {}", todo.id, mark, todo.title);
        }
        println!("{}", app.summary());
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::run()
}
