//! Tracks which containers are open so that markup errors can be reported
//! with a precise message instead of producing broken HTML silently.

use std::fmt;

use crate::diagnostic::{E_ALREADY_OPEN, E_NOT_OPEN, E_OUT_OF_CONTEXT, E_STILL_OPEN};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Container {
    Paragraph,
    Bold,
    Italic,
    Underline,
    Strike,
    Superscript,
    Subscript,
    Quote,
    OrderedList,
    UnorderedList,
    ListItem,
    DataList,
    DataTopic,
    DataDescription,
    Grid,
    GridRow,
    GridCell,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    AlertBox,
    UserInterface,
}

const COUNT: usize = 23;

impl Container {
    /// Reporting order for unclosed containers.
    pub const ALL: [Container; COUNT] = [
        Container::Paragraph,
        Container::Bold,
        Container::Italic,
        Container::Underline,
        Container::Strike,
        Container::Superscript,
        Container::Subscript,
        Container::Quote,
        Container::OrderedList,
        Container::UnorderedList,
        Container::ListItem,
        Container::DataList,
        Container::DataTopic,
        Container::DataDescription,
        Container::Grid,
        Container::GridRow,
        Container::GridCell,
        Container::Table,
        Container::TableRow,
        Container::TableHeader,
        Container::TableCell,
        Container::AlertBox,
        Container::UserInterface,
    ];

    pub fn description(self) -> &'static str {
        match self {
            Container::Paragraph => "paragraph",
            Container::Bold => "bold",
            Container::Italic => "italic",
            Container::Underline => "underline",
            Container::Strike => "strike-through",
            Container::Superscript => "superscript",
            Container::Subscript => "subscript",
            Container::Quote => "quote",
            Container::OrderedList => "ordered list",
            Container::UnorderedList => "unordered list",
            Container::ListItem => "list item",
            Container::DataList => "data list",
            Container::DataTopic => "data topic",
            Container::DataDescription => "data description",
            Container::Grid => "grid",
            Container::GridRow => "grid row",
            Container::GridCell => "grid cell",
            Container::Table => "table",
            Container::TableRow => "table row",
            Container::TableHeader => "table header",
            Container::TableCell => "table cell",
            Container::AlertBox => "alert box",
            Container::UserInterface => "user interface element",
        }
    }

    /// Containers that may not be nested inside themselves.
    fn exclusive(self) -> bool {
        matches!(
            self,
            Container::Bold
                | Container::Italic
                | Container::Underline
                | Container::Strike
                | Container::Quote
                | Container::AlertBox
                | Container::UserInterface
        )
    }

    /// The container that must be open for this one to be opened, if any.
    fn parent(self) -> Option<&'static str> {
        match self {
            Container::ListItem => Some("list"),
            Container::DataTopic | Container::DataDescription => Some("data list"),
            Container::GridRow => Some("grid"),
            Container::GridCell => Some("grid row"),
            Container::TableRow => Some("table"),
            Container::TableHeader | Container::TableCell => Some("table row"),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Violation {
    AlreadyOpen(Container),
    NotOpen(Container),
    OutOfContext(Container),
    StillOpen(Container),
}

impl Violation {
    pub fn code(self) -> &'static str {
        match self {
            Violation::AlreadyOpen(_) => E_ALREADY_OPEN,
            Violation::NotOpen(_) => E_NOT_OPEN,
            Violation::OutOfContext(_) => E_OUT_OF_CONTEXT,
            Violation::StillOpen(_) => E_STILL_OPEN,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Violation::AlreadyOpen(c) => write!(f, "{} is already open", c.description()),
            Violation::NotOpen(c) => write!(f, "cannot close, {} is not open", c.description()),
            Violation::OutOfContext(c) => write!(
                f,
                "cannot add {}, {} is not open",
                c.description(),
                c.parent().unwrap_or("container")
            ),
            Violation::StillOpen(c) => write!(f, "{} is still open", c.description()),
        }
    }
}

/// Open counters for every container kind. Nested lists, tables and grids
/// are tracked by comparing the counter of a child with its parent's.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Validator {
    open: [usize; COUNT],
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self, container: Container) -> usize {
        self.open[container.index()]
    }

    fn get(&self, container: Container) -> usize {
        self.open[container.index()]
    }

    /// Checks and records opening `container`. On error nothing changes and
    /// the tag must not be emitted.
    pub fn open(&mut self, container: Container) -> Result<(), Violation> {
        let allowed = match container {
            c if c.exclusive() => {
                if self.get(c) > 0 {
                    return Err(Violation::AlreadyOpen(c));
                }
                true
            }
            Container::ListItem => {
                self.get(Container::OrderedList) + self.get(Container::UnorderedList) > 0
            }
            Container::DataTopic | Container::DataDescription => self.get(Container::DataList) > 0,
            Container::GridRow => self.get(Container::Grid) > 0,
            Container::GridCell => {
                let rows = self.get(Container::GridRow);
                rows > 0 && rows >= self.get(Container::Grid)
            }
            Container::TableRow => self.get(Container::Table) > 0,
            Container::TableHeader | Container::TableCell => {
                let rows = self.get(Container::TableRow);
                rows > 0 && rows >= self.get(Container::Table)
            }
            _ => true,
        };
        if !allowed {
            return Err(Violation::OutOfContext(container));
        }
        self.open[container.index()] += 1;
        Ok(())
    }

    /// Checks and records closing `container`. `Err` means the close tag
    /// must be dropped; `Ok(Some(_))` means it is emitted but a problem with
    /// a still open child must be reported as well.
    pub fn close(&mut self, container: Container) -> Result<Option<Violation>, Violation> {
        let current = self.get(container);
        let enclosing = match container {
            Container::ListItem => {
                self.get(Container::OrderedList) + self.get(Container::UnorderedList)
            }
            Container::DataTopic | Container::DataDescription => self.get(Container::DataList),
            Container::GridCell => self.get(Container::GridRow),
            Container::GridRow => self.get(Container::Grid),
            Container::TableHeader | Container::TableCell => self.get(Container::TableRow),
            Container::TableRow => self.get(Container::Table),
            _ => 0,
        };
        if current == 0 || current < enclosing {
            return Err(Violation::NotOpen(container));
        }
        let still_open = match container {
            Container::OrderedList | Container::UnorderedList => {
                let lists = self.get(Container::OrderedList) + self.get(Container::UnorderedList);
                (self.get(Container::ListItem) >= lists).then_some(Container::ListItem)
            }
            Container::DataList => [Container::DataTopic, Container::DataDescription]
                .into_iter()
                .find(|child| self.get(*child) > current),
            Container::Grid => {
                (self.get(Container::GridRow) > current).then_some(Container::GridRow)
            }
            Container::GridRow => {
                (self.get(Container::GridCell) > current).then_some(Container::GridCell)
            }
            Container::Table => {
                (self.get(Container::TableRow) > current).then_some(Container::TableRow)
            }
            Container::TableRow => [Container::TableCell, Container::TableHeader]
                .into_iter()
                .find(|child| self.get(*child) > current),
            _ => None,
        };
        self.open[container.index()] -= 1;
        Ok(still_open.map(Violation::StillOpen))
    }

    /// Returns every container left open, in reporting order, and clears
    /// all counters.
    pub fn take_unclosed(&mut self) -> Vec<Container> {
        let unclosed = Container::ALL
            .into_iter()
            .filter(|c| self.get(*c) > 0)
            .collect();
        self.open = [0; COUNT];
        unclosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_containers_reject_nesting() {
        let mut validator = Validator::new();
        assert_eq!(validator.open(Container::Bold), Ok(()));
        assert_eq!(
            validator.open(Container::Bold),
            Err(Violation::AlreadyOpen(Container::Bold))
        );
        assert_eq!(validator.close(Container::Bold), Ok(None));
        assert_eq!(
            validator.close(Container::Bold),
            Err(Violation::NotOpen(Container::Bold))
        );
    }

    #[test]
    fn reentrant_containers_nest() {
        let mut validator = Validator::new();
        validator.open(Container::Paragraph).unwrap();
        validator.open(Container::Paragraph).unwrap();
        assert_eq!(validator.depth(Container::Paragraph), 2);
        assert_eq!(validator.close(Container::Paragraph), Ok(None));
        assert_eq!(validator.close(Container::Paragraph), Ok(None));
    }

    #[test]
    fn list_item_requires_a_list() {
        let mut validator = Validator::new();
        let err = validator.open(Container::ListItem).unwrap_err();
        assert_eq!(err.to_string(), "cannot add list item, list is not open");
        assert_eq!(
            validator.close(Container::ListItem),
            Err(Violation::NotOpen(Container::ListItem))
        );
        assert!(validator.take_unclosed().is_empty());
    }

    #[test]
    fn closing_list_with_open_item_reports_but_closes() {
        let mut validator = Validator::new();
        validator.open(Container::UnorderedList).unwrap();
        validator.open(Container::ListItem).unwrap();
        assert_eq!(
            validator.close(Container::UnorderedList),
            Ok(Some(Violation::StillOpen(Container::ListItem)))
        );
        assert_eq!(validator.depth(Container::UnorderedList), 0);
        assert_eq!(validator.take_unclosed(), vec![Container::ListItem]);
    }

    #[test]
    fn nested_list_items_are_matched_per_level() {
        let mut validator = Validator::new();
        validator.open(Container::OrderedList).unwrap();
        validator.open(Container::ListItem).unwrap();
        validator.open(Container::UnorderedList).unwrap();
        validator.open(Container::ListItem).unwrap();
        assert_eq!(validator.close(Container::ListItem), Ok(None));
        assert_eq!(validator.close(Container::UnorderedList), Ok(None));
        assert_eq!(validator.close(Container::ListItem), Ok(None));
        assert_eq!(validator.close(Container::OrderedList), Ok(None));
        assert!(validator.take_unclosed().is_empty());
    }

    #[test]
    fn table_cells_need_a_row() {
        let mut validator = Validator::new();
        validator.open(Container::Table).unwrap();
        assert_eq!(
            validator.open(Container::TableCell),
            Err(Violation::OutOfContext(Container::TableCell))
        );
        validator.open(Container::TableRow).unwrap();
        validator.open(Container::TableCell).unwrap();
        assert_eq!(
            validator.close(Container::TableRow),
            Ok(Some(Violation::StillOpen(Container::TableCell)))
        );
        assert_eq!(validator.close(Container::Table), Ok(None));
    }

    #[test]
    fn grid_rows_and_cells() {
        let mut validator = Validator::new();
        assert_eq!(
            validator.open(Container::GridRow),
            Err(Violation::OutOfContext(Container::GridRow))
        );
        validator.open(Container::Grid).unwrap();
        validator.open(Container::GridRow).unwrap();
        validator.open(Container::GridCell).unwrap();
        assert_eq!(validator.close(Container::GridCell), Ok(None));
        assert_eq!(validator.close(Container::GridRow), Ok(None));
        assert_eq!(
            validator.close(Container::GridRow),
            Err(Violation::NotOpen(Container::GridRow))
        );
        assert_eq!(validator.close(Container::Grid), Ok(None));
    }

    #[test]
    fn take_unclosed_reports_in_fixed_order_and_resets() {
        let mut validator = Validator::new();
        validator.open(Container::Table).unwrap();
        validator.open(Container::Bold).unwrap();
        validator.open(Container::Paragraph).unwrap();
        assert_eq!(
            validator.take_unclosed(),
            vec![Container::Paragraph, Container::Bold, Container::Table]
        );
        assert_eq!(validator, Validator::new());
    }
}
