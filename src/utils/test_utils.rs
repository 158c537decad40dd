#[cfg(test)]
use crate::core::app::App;
#[cfg(test)]
use crate::ui::theme::Theme;

#[cfg(test)]
pub fn create_test_app() -> App {
    App::new_test_app(Theme::dark_default(), true)
}
