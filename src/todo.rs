// File: ./src/todo.rs
use crate::model::Todo;

/// Operations on the user's todo list. Callers persist after each mutation.
pub trait TodoList {
    /// Appends `text` unless it is blank. Returns whether anything was added.
    fn add_todo(&mut self, text: &str) -> bool;
    fn toggle_todo(&mut self, index: usize) -> bool;
    fn remove_todo(&mut self, index: usize) -> bool;
    fn progress(&self) -> (usize, usize);

    fn percent(&self) -> f64 {
        let (done, total) = self.progress();
        if total == 0 {
            0.0
        } else {
            done as f64 / total as f64 * 100.0
        }
    }

    fn progress_text(&self) -> String {
        let (done, total) = self.progress();
        format!("{}/{} 完了", done, total)
    }
}

impl TodoList for Vec<Todo> {
    fn add_todo(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.push(Todo::new(text));
        true
    }

    fn toggle_todo(&mut self, index: usize) -> bool {
        match self.get_mut(index) {
            Some(todo) => {
                todo.done = !todo.done;
                true
            }
            None => false,
        }
    }

    fn remove_todo(&mut self, index: usize) -> bool {
        if index < self.len() {
            self.remove(index);
            true
        } else {
            false
        }
    }

    fn progress(&self) -> (usize, usize) {
        (self.iter().filter(|t| t.done).count(), self.len())
    }
}
