//! Table view-model: header columns, cell grid, and row selection
//!
//! The presentation layer reads the model to render and writes back through
//! the mutation API in response to gestures. Change notifications go out on
//! subscribed channels instead of any implicit binding, and every operation
//! that removes or reorders rows rewrites the selection in terms of the new
//! index positions.

use crate::error::ModelError;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::sync::mpsc::{self, Receiver, Sender};
use unicode_width::UnicodeWidthStr;

/// Comparator for cells within a single column
pub type CellComparator = Box<dyn Fn(&TableItem, &TableItem) -> Ordering + Send>;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableItem {
    pub data: String,
}

impl TableItem {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

/// A header column descriptor
pub struct TableHeaderItem {
    /// Display label
    pub data: String,
    /// Whether the column participates in sorting
    pub sortable: bool,
    comparator: Option<CellComparator>,
}

impl TableHeaderItem {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            sortable: true,
            comparator: None,
        }
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Install a comparator used when sorting by this column
    pub fn with_comparator(mut self, comparator: CellComparator) -> Self {
        self.comparator = Some(comparator);
        self
    }
}

impl fmt::Debug for TableHeaderItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHeaderItem")
            .field("data", &self.data)
            .field("sortable", &self.sortable)
            .field("has_comparator", &self.comparator.is_some())
            .finish()
    }
}

/// Change notifications emitted by the table model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    RowSelected(usize),
    RowDeselected(usize),
    /// One event for the whole select-all, never one per row
    SelectAll,
    /// One event for the whole deselect-all
    DeselectAll,
    /// Rows or columns were replaced, reordered or resized
    DataChanged,
}

/// Table view-model holding columns, rows and selection state
///
/// Constructed empty; the owning presentation layer assigns header and data,
/// then drives selection through the toggle operations.
#[derive(Default)]
pub struct TableModel {
    header: Vec<TableHeaderItem>,
    data: Vec<Vec<TableItem>>,
    row_selection: HashSet<usize>,
    subscribers: Vec<Sender<TableEvent>>,
}

impl TableModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from CSV data: headers become columns, records rows
    pub fn read_csv<R: Read>(reader: R) -> Result<TableModel, ModelError> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let header = csv_reader
            .headers()?
            .iter()
            .map(TableHeaderItem::new)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(TableItem::new).collect());
        }

        let mut model = TableModel::new();
        model.set_all(header, rows)?;
        Ok(model)
    }

    pub fn header(&self) -> &[TableHeaderItem] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<TableItem>] {
        &self.data
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Subscribe to change notifications
    ///
    /// Subscribers whose receiver is dropped are pruned on the next emit.
    pub fn subscribe(&mut self) -> Receiver<TableEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: TableEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    /// Replace the header; any sequence is accepted
    ///
    /// Callers replacing both header and data should use `set_all` so the
    /// shape check runs against the new header.
    pub fn set_header(&mut self, header: Vec<TableHeaderItem>) {
        self.header = header;
        self.emit(TableEvent::DataChanged);
    }

    /// Replace the row data, validating each row against the current header
    ///
    /// On a shape mismatch nothing is applied. Wholesale replacement clears
    /// the selection; old indices carry no meaning against new rows.
    pub fn set_data(&mut self, rows: Vec<Vec<TableItem>>) -> Result<(), ModelError> {
        Self::check_shape(self.header.len(), &rows)?;
        self.data = rows;
        self.row_selection.clear();
        self.emit(TableEvent::DataChanged);
        Ok(())
    }

    /// Replace header and rows atomically, validating rows against the new header
    pub fn set_all(
        &mut self,
        header: Vec<TableHeaderItem>,
        rows: Vec<Vec<TableItem>>,
    ) -> Result<(), ModelError> {
        Self::check_shape(header.len(), &rows)?;
        self.header = header;
        self.data = rows;
        self.row_selection.clear();
        self.emit(TableEvent::DataChanged);
        Ok(())
    }

    fn check_shape(expected: usize, rows: &[Vec<TableItem>]) -> Result<(), ModelError> {
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(ModelError::Shape {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }
        Ok(())
    }

    /// Append a row matching the current header shape
    pub fn add_row(&mut self, row: Vec<TableItem>) -> Result<(), ModelError> {
        if row.len() != self.header.len() {
            return Err(ModelError::Shape {
                row: self.data.len(),
                expected: self.header.len(),
                found: row.len(),
            });
        }
        self.data.push(row);
        self.emit(TableEvent::DataChanged);
        Ok(())
    }

    /// Remove a row, dropping its selection and shifting higher indices down
    ///
    /// Out-of-range indices are ignored; the row may already be gone by the
    /// time a gesture lands.
    pub fn remove_row(&mut self, index: usize) {
        if index >= self.data.len() {
            return;
        }
        self.data.remove(index);
        self.row_selection = self
            .row_selection
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        self.emit(TableEvent::DataChanged);
    }

    /// Mark a row selected; out-of-range indices are silently ignored
    pub fn select_row(&mut self, index: usize) {
        if index >= self.data.len() {
            return;
        }
        if self.row_selection.insert(index) {
            self.emit(TableEvent::RowSelected(index));
        }
    }

    /// Mark a row deselected; a no-op when the index is not selected
    pub fn deselect_row(&mut self, index: usize) {
        if self.row_selection.remove(&index) {
            self.emit(TableEvent::RowDeselected(index));
        }
    }

    /// Select every row, emitting a single event
    pub fn select_all(&mut self) {
        self.row_selection = (0..self.data.len()).collect();
        self.emit(TableEvent::SelectAll);
    }

    /// Clear the selection, emitting a single event
    pub fn deselect_all(&mut self) {
        self.row_selection.clear();
        self.emit(TableEvent::DeselectAll);
    }

    /// Check whether a row is selected
    pub fn is_row_selected(&self, index: usize) -> bool {
        self.row_selection.contains(&index)
    }

    pub fn selected_count(&self) -> usize {
        self.row_selection.len()
    }

    /// Selected row indices in ascending order
    pub fn selected_rows(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.row_selection.iter().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Install a comparator for a column; out-of-range columns are ignored
    pub fn set_comparator(&mut self, column: usize, comparator: CellComparator) {
        if let Some(item) = self.header.get_mut(column) {
            item.comparator = Some(comparator);
        }
    }

    /// Stable-sort rows by a column, remapping the selection through the permutation
    ///
    /// Ignored for out-of-range or non-sortable columns. Without an installed
    /// comparator cells compare lexicographically on their data.
    pub fn sort(&mut self, column: usize) {
        let Some(header_item) = self.header.get(column) else {
            return;
        };
        if !header_item.sortable {
            return;
        }

        let mut order: Vec<usize> = (0..self.data.len()).collect();
        match &header_item.comparator {
            Some(comparator) => {
                order.sort_by(|&a, &b| comparator(&self.data[a][column], &self.data[b][column]));
            }
            None => {
                order.sort_by(|&a, &b| self.data[a][column].data.cmp(&self.data[b][column].data));
            }
        }

        self.reorder(&order);
        self.emit(TableEvent::DataChanged);
    }

    /// Keep only rows matching the predicate, remapping the selection
    ///
    /// Rows filtered out lose their selection; adding them back later starts
    /// them unselected.
    pub fn apply_filter(&mut self, predicate: impl Fn(&[TableItem]) -> bool) {
        let keep: Vec<usize> = (0..self.data.len())
            .filter(|&i| predicate(&self.data[i]))
            .collect();
        self.reorder(&keep);
        self.emit(TableEvent::DataChanged);
    }

    /// Rebuild rows and selection from old row indices listed in new order
    fn reorder(&mut self, order: &[usize]) {
        let old_rows = std::mem::take(&mut self.data);
        let old_selection = std::mem::take(&mut self.row_selection);

        let mut slots: Vec<Option<Vec<TableItem>>> = old_rows.into_iter().map(Some).collect();
        self.data = order
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect();
        self.row_selection = order
            .iter()
            .enumerate()
            .filter(|(_, old)| old_selection.contains(old))
            .map(|(new, _)| new)
            .collect();
    }

    /// Unicode display width per column: the widest of header label and cells
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.data.width()).collect();
        for row in &self.data {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.data.width());
                }
            }
        }
        widths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to build a one-column model with the given cell values
    fn create_test_model(rows: &[&str]) -> TableModel {
        let mut model = TableModel::new();
        model
            .set_all(
                vec![TableHeaderItem::new("Column")],
                rows.iter().map(|r| vec![TableItem::new(*r)]).collect(),
            )
            .unwrap();
        model
    }

    fn drain_events(receiver: &Receiver<TableEvent>) -> Vec<TableEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_select_then_deselect_restores_prior_state() {
        let mut model = create_test_model(&["Lorem", "ipsum", "dolor", "sit"]);
        model.select_row(0);
        let prior_count = model.selected_count();

        model.select_row(2);
        model.deselect_row(2);

        assert!(!model.is_row_selected(2));
        assert_eq!(model.selected_count(), prior_count);
    }

    #[test]
    fn test_select_row_out_of_range_is_ignored() {
        let mut model = create_test_model(&["Lorem", "ipsum"]);
        model.select_row(99);
        assert_eq!(model.selected_count(), 0);
    }

    #[test]
    fn test_select_row_already_selected_is_a_noop() {
        let mut model = create_test_model(&["Lorem", "ipsum"]);
        let events = model.subscribe();

        model.select_row(1);
        model.select_row(1);

        assert_eq!(model.selected_count(), 1);
        assert_eq!(drain_events(&events), vec![TableEvent::RowSelected(1)]);
    }

    #[test]
    fn test_deselect_row_not_selected_is_a_noop() {
        let mut model = create_test_model(&["Lorem", "ipsum"]);
        let events = model.subscribe();

        model.deselect_row(0);

        assert_eq!(model.selected_count(), 0);
        assert!(drain_events(&events).is_empty());
    }

    #[test]
    fn test_select_all_then_deselect_all_for_any_row_count() {
        for rows in [&[][..], &["Lorem"][..], &["Lorem", "ipsum", "dolor", "sit"][..]] {
            let mut model = create_test_model(rows);
            model.select_all();
            assert_eq!(model.selected_count(), rows.len());

            model.deselect_all();
            assert_eq!(model.selected_count(), 0);
        }
    }

    #[test]
    fn test_select_all_emits_a_single_event() {
        let mut model = create_test_model(&["Lorem", "ipsum", "dolor", "sit"]);
        let events = model.subscribe();

        model.select_all();
        assert_eq!(drain_events(&events), vec![TableEvent::SelectAll]);

        model.deselect_all();
        assert_eq!(drain_events(&events), vec![TableEvent::DeselectAll]);
    }

    #[test]
    fn test_set_data_rejects_shape_mismatch() {
        let mut model = TableModel::new();
        model.set_header(vec![
            TableHeaderItem::new("Name"),
            TableHeaderItem::new("Size"),
        ]);

        let result = model.set_data(vec![vec![TableItem::new("only one cell")]]);

        match result {
            Err(ModelError::Shape {
                row,
                expected,
                found,
            }) => {
                assert_eq!(row, 0);
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected shape error, got {:?}", other),
        }
        assert_eq!(model.row_count(), 0);
    }

    #[test]
    fn test_set_all_validates_against_new_header() {
        let mut model = create_test_model(&["Lorem"]);

        model
            .set_all(
                vec![TableHeaderItem::new("a"), TableHeaderItem::new("b")],
                vec![vec![TableItem::new("1"), TableItem::new("2")]],
            )
            .unwrap();

        assert_eq!(model.column_count(), 2);
        assert_eq!(model.row_count(), 1);
        assert_eq!(model.selected_count(), 0);
    }

    #[test]
    fn test_add_row_checks_shape() {
        let mut model = create_test_model(&["Lorem"]);

        assert!(model.add_row(vec![TableItem::new("ipsum")]).is_ok());
        assert!(model
            .add_row(vec![TableItem::new("a"), TableItem::new("b")])
            .is_err());
        assert_eq!(model.row_count(), 2);
    }

    #[test]
    fn test_remove_row_shifts_selection_down() {
        let mut model = create_test_model(&["Lorem", "ipsum", "dolor", "sit"]);
        model.select_row(1);
        model.select_row(3);

        model.remove_row(1);

        assert_eq!(model.row_count(), 3);
        assert_eq!(model.selected_rows(), vec![2]);
    }

    #[test]
    fn test_remove_row_out_of_range_is_ignored() {
        let mut model = create_test_model(&["Lorem"]);
        model.remove_row(5);
        assert_eq!(model.row_count(), 1);
    }

    #[test]
    fn test_sort_defaults_to_lexicographic_order() {
        let mut model = create_test_model(&["dolor", "Lorem", "sit", "ipsum"]);
        model.sort(0);

        let cells: Vec<&str> = model.rows().iter().map(|r| r[0].data.as_str()).collect();
        assert_eq!(cells, vec!["Lorem", "dolor", "ipsum", "sit"]);
    }

    #[test]
    fn test_sort_remaps_selection_through_permutation() {
        let mut model = create_test_model(&["3", "1", "2"]);
        model.set_comparator(
            0,
            Box::new(|a, b| {
                let a: u32 = a.data.parse().unwrap();
                let b: u32 = b.data.parse().unwrap();
                a.cmp(&b)
            }),
        );
        model.select_row(0);

        model.sort(0);

        let cells: Vec<&str> = model.rows().iter().map(|r| r[0].data.as_str()).collect();
        assert_eq!(cells, vec!["1", "2", "3"]);
        assert_eq!(model.selected_rows(), vec![2]);
    }

    #[test]
    fn test_sort_ignores_non_sortable_column() {
        let mut model = TableModel::new();
        model
            .set_all(
                vec![TableHeaderItem::new("Column").with_sortable(false)],
                vec![vec![TableItem::new("b")], vec![TableItem::new("a")]],
            )
            .unwrap();

        model.sort(0);

        assert_eq!(model.rows()[0][0].data, "b");
    }

    #[test]
    fn test_filter_drops_selection_of_excluded_rows() {
        let mut model = create_test_model(&["Lorem", "ipsum", "dolor", "sit"]);
        model.select_row(1);
        model.select_row(2);

        model.apply_filter(|row| row[0].data != "ipsum");

        // "dolor" moved from index 2 to 1, "ipsum" is gone entirely
        assert_eq!(model.row_count(), 3);
        assert_eq!(model.selected_rows(), vec![1]);
    }

    #[test]
    fn test_filtered_out_selection_is_not_resurrected() {
        let mut model = create_test_model(&["Lorem", "ipsum"]);
        model.select_row(1);

        model.apply_filter(|row| row[0].data != "ipsum");
        assert_eq!(model.selected_count(), 0);

        // Re-including the row later starts it unselected
        model
            .set_data(vec![vec![TableItem::new("Lorem")], vec![TableItem::new("ipsum")]])
            .unwrap();
        assert!(!model.is_row_selected(1));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut model = create_test_model(&["Lorem"]);
        let events = model.subscribe();
        drop(events);

        model.select_all();

        assert!(model.subscribers.is_empty());
    }

    #[test]
    fn test_column_widths_use_display_width() {
        let mut model = TableModel::new();
        model
            .set_all(
                vec![TableHeaderItem::new("名前"), TableHeaderItem::new("Size")],
                vec![vec![TableItem::new("ok"), TableItem::new("1234567")]],
            )
            .unwrap();

        // "名前" is two double-width characters
        assert_eq!(model.column_widths(), vec![4, 7]);
    }

    #[test]
    fn test_read_csv_builds_header_and_rows() {
        let data = "name,size\nphoto.png,1024\nnotes.txt,2048\n";
        let model = TableModel::read_csv(data.as_bytes()).unwrap();

        assert_eq!(model.column_count(), 2);
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.header()[0].data, "name");
        assert_eq!(model.rows()[1][1].data, "2048");
    }
}
