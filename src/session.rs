// Split session - who owes what
// Holds the classified items, the participant registry and every assignment.
// Items are only ever mutated through the operations here, never by
// re-parsing the receipt.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::classify::{Classifier, TaxContext};
use crate::convert::{convert_items, ConversionOutcome, ConversionStatus, ExchangeRateProvider};
use crate::currency::CurrencyDetector;
use crate::extract::extract_items;
use crate::item::{LineItem, ReceiptAnalysis, SpecialKind};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    UnknownItem(String),
    UnknownParticipant(String),
    DuplicateParticipant(String),
    EmptyParticipantName,
    /// toggle_share on an item assigned unit by unit
    PerUnitItem(String),
    /// add_unit/remove_unit on a pooled item
    PooledItem(String),
    /// calculate_split while these items have nobody assigned
    UnassignedItems(Vec<String>),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::UnknownItem(id) => write!(f, "no item with id {}", id),
            SessionError::UnknownParticipant(name) => write!(f, "unknown participant: {}", name),
            SessionError::DuplicateParticipant(name) => {
                write!(f, "participant already exists: {}", name)
            }
            SessionError::EmptyParticipantName => write!(f, "participant name is empty"),
            SessionError::PerUnitItem(name) => {
                write!(f, "{} is assigned per unit, use add_unit/remove_unit", name)
            }
            SessionError::PooledItem(name) => {
                write!(f, "{} is shared as a pool, use toggle_share", name)
            }
            SessionError::UnassignedItems(names) => {
                write!(f, "items without anyone assigned: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for SessionError {}

// ============================================================================
// ASSIGNMENTS
// ============================================================================

/// How one item maps to participants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Assignment {
    /// One pool, every member owes an equal fraction
    Shared { members: Vec<String> },

    /// One slot per unit (index 0..quantity), each optionally held
    Units { slots: Vec<Option<String>> },
}

impl Assignment {
    fn for_item(item: &LineItem) -> Self {
        if item.per_unit() {
            Assignment::Units {
                slots: vec![None; item.quantity as usize],
            }
        } else {
            Assignment::Shared { members: Vec::new() }
        }
    }

    /// Nobody assigned yet (pool empty, or any unit slot still open)
    pub fn unassigned(&self) -> bool {
        match self {
            Assignment::Shared { members } => members.is_empty(),
            Assignment::Units { slots } => slots.iter().any(|slot| slot.is_none()),
        }
    }

    /// Units already handed out, for the progress metric
    pub fn assigned_units(&self) -> usize {
        match self {
            Assignment::Shared { members } => usize::from(!members.is_empty()),
            Assignment::Units { slots } => slots.iter().filter(|slot| slot.is_some()).count(),
        }
    }

    /// Units this assignment can hold
    pub fn total_units(&self) -> usize {
        match self {
            Assignment::Shared { .. } => 1,
            Assignment::Units { slots } => slots.len(),
        }
    }

    /// Remove every trace of a participant
    fn purge(&mut self, name: &str) {
        match self {
            Assignment::Shared { members } => members.retain(|member| member != name),
            Assignment::Units { slots } => {
                for slot in slots.iter_mut() {
                    if slot.as_deref() == Some(name) {
                        *slot = None;
                    }
                }
            }
        }
    }
}

/// An item together with its assignment state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedItem {
    pub item: LineItem,
    pub assignment: Assignment,
}

impl AssignedItem {
    fn new(item: LineItem) -> Self {
        let assignment = Assignment::for_item(&item);
        AssignedItem { item, assignment }
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// One receipt being split among participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSession {
    pub(crate) items: Vec<AssignedItem>,
    pub(crate) participants: Vec<String>,
    pub(crate) tax: TaxContext,
    pub(crate) currency: String,
    pub(crate) conversion: ConversionStatus,
}

impl SplitSession {
    /// Empty session, default currency, tax not included
    pub fn new() -> Self {
        SplitSession {
            items: Vec::new(),
            participants: Vec::new(),
            tax: TaxContext::excluded(),
            currency: crate::currency::DEFAULT_CURRENCY.to_string(),
            conversion: ConversionStatus::NotRequested,
        }
    }

    /// Builder pattern: set the tax metadata
    pub fn with_tax(mut self, tax: TaxContext) -> Self {
        self.tax = tax;
        self
    }

    /// Builder pattern: set the source currency
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Build a session from a document-understanding payload: take the
    /// service's items when present, otherwise extract from the raw text;
    /// classify; detect the currency when the payload carries none.
    pub fn from_analysis(analysis: &ReceiptAnalysis) -> Self {
        let raw_items = if analysis.items.is_empty() {
            extract_items(&analysis.raw_text)
        } else {
            analysis.items.clone()
        };

        let tax = TaxContext {
            included: analysis.tax_included,
            reason: analysis.tax_inclusion_reason.clone(),
        };
        let items = Classifier::new().classify_all(raw_items, &tax);

        let currency = match &analysis.currency {
            Some(code) if !code.trim().is_empty() => code.trim().to_uppercase(),
            _ => CurrencyDetector::new().detect(&analysis.raw_text),
        };

        let mut session = SplitSession::new().with_tax(tax).with_currency(currency);
        session.load_items(items);
        session
    }

    // ------------------------------------------------------------------
    // accessors
    // ------------------------------------------------------------------

    pub fn items(&self) -> &[AssignedItem] {
        &self.items
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn tax(&self) -> &TaxContext {
        &self.tax
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn conversion(&self) -> &ConversionStatus {
        &self.conversion
    }

    fn index_of(&self, item_id: &str) -> Result<usize, SessionError> {
        self.items
            .iter()
            .position(|entry| entry.item.id == item_id)
            .ok_or_else(|| SessionError::UnknownItem(item_id.to_string()))
    }

    fn require_participant(&self, name: &str) -> Result<(), SessionError> {
        if self.participants.iter().any(|p| p == name) {
            Ok(())
        } else {
            Err(SessionError::UnknownParticipant(name.to_string()))
        }
    }

    // ------------------------------------------------------------------
    // items
    // ------------------------------------------------------------------

    /// Replace the item set (classified items straight from the pipeline).
    /// Existing assignments are discarded; specials get auto-assigned.
    pub fn load_items(&mut self, items: Vec<LineItem>) {
        self.items = items.into_iter().map(AssignedItem::new).collect();
        self.conversion = ConversionStatus::NotRequested;
        self.auto_assign_special_items();
        debug!("session: loaded {} items", self.items.len());
    }

    /// Add one item (a manual correction in the editing flow)
    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(AssignedItem::new(item));
        self.auto_assign_special_items();
    }

    pub fn remove_item(&mut self, item_id: &str) -> Result<LineItem, SessionError> {
        let idx = self.index_of(item_id)?;
        Ok(self.items.remove(idx).item)
    }

    // ------------------------------------------------------------------
    // participants
    // ------------------------------------------------------------------

    /// Register a participant. Names are identities here: blank and
    /// duplicate names are rejected.
    pub fn add_participant(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyParticipantName);
        }
        if self.participants.iter().any(|p| p == name) {
            return Err(SessionError::DuplicateParticipant(name.to_string()));
        }

        self.participants.push(name.to_string());
        debug!("session: added participant {}", name);
        self.auto_assign_special_items();
        Ok(())
    }

    /// Remove a participant and purge them from every assignment
    pub fn remove_participant(&mut self, name: &str) -> Result<(), SessionError> {
        let before = self.participants.len();
        self.participants.retain(|p| p != name);
        if self.participants.len() == before {
            return Err(SessionError::UnknownParticipant(name.to_string()));
        }

        for entry in &mut self.items {
            entry.assignment.purge(name);
        }
        debug!("session: removed participant {}", name);
        Ok(())
    }

    // ------------------------------------------------------------------
    // assignment operations
    // ------------------------------------------------------------------

    /// Pooled items only: add the participant to the pool, or remove them
    /// if already in. Per-unit items use add_unit/remove_unit instead.
    pub fn toggle_share(&mut self, item_id: &str, name: &str) -> Result<(), SessionError> {
        self.require_participant(name)?;
        let idx = self.index_of(item_id)?;
        let entry = &mut self.items[idx];

        match &mut entry.assignment {
            Assignment::Shared { members } => {
                if let Some(pos) = members.iter().position(|member| member == name) {
                    members.remove(pos);
                    debug!("session: {} left {:?}", name, entry.item.name);
                } else {
                    members.push(name.to_string());
                    debug!("session: {} joined {:?}", name, entry.item.name);
                }
                Ok(())
            }
            Assignment::Units { .. } => Err(SessionError::PerUnitItem(entry.item.name.clone())),
        }
    }

    /// Per-unit items only: hand the first open unit to the participant.
    /// No-op when every unit is taken.
    pub fn add_unit(&mut self, item_id: &str, name: &str) -> Result<(), SessionError> {
        self.require_participant(name)?;
        let idx = self.index_of(item_id)?;
        let entry = &mut self.items[idx];

        match &mut entry.assignment {
            Assignment::Units { slots } => {
                if let Some(slot) = slots.iter_mut().find(|slot| slot.is_none()) {
                    *slot = Some(name.to_string());
                    debug!("session: unit of {:?} -> {}", entry.item.name, name);
                } else {
                    debug!("session: {:?} has no open units", entry.item.name);
                }
                Ok(())
            }
            Assignment::Shared { .. } => Err(SessionError::PooledItem(entry.item.name.clone())),
        }
    }

    /// Per-unit items only: take one unit back from the participant.
    /// No-op when they hold none.
    pub fn remove_unit(&mut self, item_id: &str, name: &str) -> Result<(), SessionError> {
        self.require_participant(name)?;
        let idx = self.index_of(item_id)?;
        let entry = &mut self.items[idx];

        match &mut entry.assignment {
            Assignment::Units { slots } => {
                if let Some(slot) = slots
                    .iter_mut()
                    .find(|slot| slot.as_deref() == Some(name))
                {
                    *slot = None;
                    debug!("session: unit of {:?} back from {}", entry.item.name, name);
                }
                Ok(())
            }
            Assignment::Shared { .. } => Err(SessionError::PooledItem(entry.item.name.clone())),
        }
    }

    /// Flip an item between pooled and per-unit splitting, carrying the
    /// current holders across as far as the new shape allows.
    pub fn set_share_equally(&mut self, item_id: &str, flag: bool) -> Result<(), SessionError> {
        let idx = self.index_of(item_id)?;
        let entry = &mut self.items[idx];
        if entry.item.share_equally == flag {
            return Ok(());
        }

        entry.item.share_equally = flag;
        let quantity = entry.item.quantity as usize;

        let rebuilt = match (&entry.assignment, entry.item.per_unit()) {
            // pool -> unit slots: seed one unit per member
            (Assignment::Shared { members }, true) => {
                let mut slots: Vec<Option<String>> = vec![None; quantity];
                for (slot, member) in slots.iter_mut().zip(members.iter()) {
                    *slot = Some(member.clone());
                }
                Assignment::Units { slots }
            }
            // unit slots -> pool: distinct holders become members
            (Assignment::Units { slots }, false) => {
                let mut members: Vec<String> = Vec::new();
                for holder in slots.iter().flatten() {
                    if !members.iter().any(|member| member == holder) {
                        members.push(holder.clone());
                    }
                }
                Assignment::Shared { members }
            }
            // quantity 1 items stay pooled whatever the flag says
            (current, _) => current.clone(),
        };
        entry.assignment = rebuilt;
        Ok(())
    }

    /// Assignment policy for special charges: as long as anyone is at the
    /// table, taxes (when not already in the prices) and every other
    /// special charge belong to all current participants. Regular items
    /// are never assigned automatically.
    pub fn auto_assign_special_items(&mut self) {
        if self.participants.is_empty() {
            return;
        }

        for entry in &mut self.items {
            let assign = match entry.item.special_kind() {
                Some(SpecialKind::Tax) => !self.tax.included,
                Some(_) => true,
                None => false,
            };
            if !assign {
                continue;
            }

            // a unit-sliced tax line has no meaning, force one pool
            if entry.item.per_unit() {
                entry.item.share_equally = true;
            }
            entry.assignment = Assignment::Shared {
                members: self.participants.clone(),
            };
            debug!(
                "session: auto-assigned {:?} to {} participants",
                entry.item.name,
                self.participants.len()
            );
        }
    }

    // ------------------------------------------------------------------
    // assignment state
    // ------------------------------------------------------------------

    pub fn has_unassigned_items(&self) -> bool {
        self.items.iter().any(|entry| entry.assignment.unassigned())
    }

    /// Names of items nobody (fully) claimed yet, in receipt order
    pub fn unassigned_item_names(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|entry| entry.assignment.unassigned())
            .map(|entry| entry.item.name.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // currency conversion
    // ------------------------------------------------------------------

    /// Re-price every item into `target` through the provider. On failure
    /// the items keep their source-currency amounts and the failure is
    /// only visible in the returned status.
    pub fn convert_to(
        &mut self,
        provider: &dyn ExchangeRateProvider,
        target: &str,
    ) -> &ConversionStatus {
        let items: Vec<LineItem> = self.items.iter().map(|entry| entry.item.clone()).collect();
        let outcome = convert_items(provider, &items, &self.currency, target);
        self.apply_conversion(outcome);
        &self.conversion
    }

    /// Merge converted prices back by item id. Items added or removed
    /// since the conversion request are left alone; assignments never
    /// change here.
    pub fn apply_conversion(&mut self, outcome: ConversionOutcome) {
        if matches!(outcome.status, ConversionStatus::Converted { .. }) {
            for update in &outcome.items {
                if let Some(entry) = self
                    .items
                    .iter_mut()
                    .find(|entry| entry.item.id == update.id)
                {
                    entry.item.converted_unit_price = update.converted_unit_price;
                    entry.item.converted_line_total = update.converted_line_total;
                }
            }
        }
        self.conversion = outcome.status;
    }

    /// Back to source-currency amounts
    pub fn reset_conversion(&mut self) {
        for entry in &mut self.items {
            entry.item.clear_conversion();
        }
        self.conversion = ConversionStatus::NotRequested;
    }
}

impl Default for SplitSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    fn session_with(items: Vec<LineItem>, participants: &[&str]) -> SplitSession {
        let mut session = SplitSession::new();
        session.load_items(items);
        for name in participants {
            session.add_participant(name).expect("participant");
        }
        session
    }

    fn item_id(session: &SplitSession, idx: usize) -> String {
        session.items()[idx].item.id.clone()
    }

    #[test]
    fn test_participant_names_are_identities() {
        let mut session = SplitSession::new();
        assert!(session.add_participant("Alice").is_ok());
        assert_eq!(
            session.add_participant("Alice"),
            Err(SessionError::DuplicateParticipant("Alice".to_string()))
        );
        assert_eq!(
            session.add_participant("   "),
            Err(SessionError::EmptyParticipantName)
        );
        assert_eq!(session.participants(), &["Alice".to_string()]);
    }

    #[test]
    fn test_toggle_share_in_and_out() {
        let mut session = session_with(vec![LineItem::new("Pizza", 10.0, 1, 10.0)], &["Alice", "Bob"]);
        let id = item_id(&session, 0);

        session.toggle_share(&id, "Alice").expect("toggle in");
        assert!(!session.items()[0].assignment.unassigned());

        session.toggle_share(&id, "Alice").expect("toggle out");
        assert!(session.items()[0].assignment.unassigned());
    }

    #[test]
    fn test_toggle_rejects_per_unit_items() {
        let mut session = session_with(vec![LineItem::new("Beer", 3.0, 4, 12.0)], &["Alice"]);
        let id = item_id(&session, 0);

        assert_eq!(
            session.toggle_share(&id, "Alice"),
            Err(SessionError::PerUnitItem("Beer".to_string()))
        );
    }

    #[test]
    fn test_unit_assignment_fills_and_frees_slots() {
        let mut session = session_with(vec![LineItem::new("Beer", 3.0, 3, 9.0)], &["Alice", "Bob"]);
        let id = item_id(&session, 0);

        session.add_unit(&id, "Alice").expect("unit 1");
        session.add_unit(&id, "Alice").expect("unit 2");
        session.add_unit(&id, "Bob").expect("unit 3");
        assert!(!session.items()[0].assignment.unassigned());

        // capacity reached: silently ignored
        session.add_unit(&id, "Bob").expect("no-op at capacity");
        assert_eq!(session.items()[0].assignment.assigned_units(), 3);

        session.remove_unit(&id, "Alice").expect("give one back");
        assert_eq!(session.items()[0].assignment.assigned_units(), 2);
        assert!(session.items()[0].assignment.unassigned());

        // removing when none are held: no-op
        session.remove_unit(&id, "Bob").expect("held one");
        session.remove_unit(&id, "Bob").expect("no-op when empty-handed");
        assert_eq!(session.items()[0].assignment.assigned_units(), 1);
    }

    #[test]
    fn test_unit_ops_reject_pooled_items() {
        let mut session = session_with(vec![LineItem::new("Pizza", 10.0, 1, 10.0)], &["Alice"]);
        let id = item_id(&session, 0);

        assert_eq!(
            session.add_unit(&id, "Alice"),
            Err(SessionError::PooledItem("Pizza".to_string()))
        );
    }

    #[test]
    fn test_unknown_item_and_participant_errors() {
        let mut session = session_with(vec![LineItem::new("Pizza", 10.0, 1, 10.0)], &["Alice"]);
        let id = item_id(&session, 0);

        assert_eq!(
            session.toggle_share("nope", "Alice"),
            Err(SessionError::UnknownItem("nope".to_string()))
        );
        assert_eq!(
            session.toggle_share(&id, "Mallory"),
            Err(SessionError::UnknownParticipant("Mallory".to_string()))
        );
    }

    #[test]
    fn test_remove_participant_purges_assignments() {
        let mut session = session_with(
            vec![
                LineItem::new("Pizza", 10.0, 1, 10.0),
                LineItem::new("Beer", 3.0, 2, 6.0),
            ],
            &["Alice", "Bob"],
        );
        let pizza = item_id(&session, 0);
        let beer = item_id(&session, 1);

        session.toggle_share(&pizza, "Alice").expect("pool");
        session.toggle_share(&pizza, "Bob").expect("pool");
        session.add_unit(&beer, "Alice").expect("unit");
        session.add_unit(&beer, "Bob").expect("unit");

        session.remove_participant("Alice").expect("remove");

        assert_eq!(session.participants(), &["Bob".to_string()]);
        assert_eq!(session.items()[0].assignment.assigned_units(), 1);
        // Alice's beer unit is open again
        assert!(session.items()[1].assignment.unassigned());
    }

    #[test]
    fn test_auto_assign_specials_to_everyone() {
        let items = vec![
            LineItem::new("Pizza", 10.0, 1, 10.0),
            LineItem::new("Tax", 1.5, 1, 1.5).with_kind(ItemKind::Special(SpecialKind::Tax)),
            LineItem::new("Service Charge", 2.0, 1, 2.0)
                .with_kind(ItemKind::Special(SpecialKind::ServiceCharge)),
        ];
        let session = session_with(items, &["Alice", "Bob"]);

        // regular item untouched
        assert!(session.items()[0].assignment.unassigned());

        for idx in [1, 2] {
            match &session.items()[idx].assignment {
                Assignment::Shared { members } => {
                    assert_eq!(members, &["Alice".to_string(), "Bob".to_string()]);
                }
                Assignment::Units { .. } => panic!("specials are pooled"),
            }
        }
    }

    #[test]
    fn test_late_participant_joins_existing_specials() {
        let items =
            vec![LineItem::new("Tax", 1.5, 1, 1.5).with_kind(ItemKind::Special(SpecialKind::Tax))];
        let mut session = session_with(items, &["Alice"]);
        session.add_participant("Bob").expect("late joiner");

        match &session.items()[0].assignment {
            Assignment::Shared { members } => assert_eq!(members.len(), 2),
            Assignment::Units { .. } => panic!("specials are pooled"),
        }
    }

    #[test]
    fn test_included_tax_is_not_auto_assigned() {
        let items =
            vec![LineItem::new("Tax", 1.5, 1, 1.5).with_kind(ItemKind::Special(SpecialKind::Tax))];
        let mut session = SplitSession::new().with_tax(TaxContext::included("menu says so"));
        session.load_items(items);
        session.add_participant("Alice").expect("participant");

        assert!(session.items()[0].assignment.unassigned());
    }

    #[test]
    fn test_multi_unit_special_is_forced_into_one_pool() {
        let tip = LineItem::new("Tip", 2.0, 3, 6.0).with_kind(ItemKind::Special(SpecialKind::Tip));
        let session = session_with(vec![tip], &["Alice", "Bob"]);

        let entry = &session.items()[0];
        assert!(entry.item.share_equally);
        assert!(matches!(entry.assignment, Assignment::Shared { .. }));
    }

    #[test]
    fn test_set_share_equally_converts_assignment_both_ways() {
        let mut session = session_with(vec![LineItem::new("Paella", 9.0, 3, 27.0)], &["Alice", "Bob"]);
        let id = item_id(&session, 0);

        session.add_unit(&id, "Alice").expect("unit");
        session.add_unit(&id, "Alice").expect("unit");
        session.add_unit(&id, "Bob").expect("unit");

        // units -> pool keeps distinct holders
        session.set_share_equally(&id, true).expect("to pool");
        match &session.items()[0].assignment {
            Assignment::Shared { members } => {
                assert_eq!(members, &["Alice".to_string(), "Bob".to_string()]);
            }
            Assignment::Units { .. } => panic!("expected pool"),
        }

        // pool -> units seeds one unit per member, rest open
        session.set_share_equally(&id, false).expect("to units");
        match &session.items()[0].assignment {
            Assignment::Units { slots } => {
                assert_eq!(slots.len(), 3);
                assert_eq!(slots.iter().filter(|slot| slot.is_some()).count(), 2);
            }
            Assignment::Shared { .. } => panic!("expected units"),
        }
    }

    #[test]
    fn test_unassigned_item_names_in_receipt_order() {
        let mut session = session_with(
            vec![
                LineItem::new("Pizza", 10.0, 1, 10.0),
                LineItem::new("Cola", 2.5, 2, 5.0),
                LineItem::new("Flan", 3.0, 1, 3.0),
            ],
            &["Alice"],
        );
        let pizza = item_id(&session, 0);
        session.toggle_share(&pizza, "Alice").expect("pool");

        assert!(session.has_unassigned_items());
        assert_eq!(
            session.unassigned_item_names(),
            vec!["Cola".to_string(), "Flan".to_string()]
        );
    }

    #[test]
    fn test_from_analysis_runs_the_whole_pipeline() {
        let analysis = ReceiptAnalysis {
            raw_text: "\
| Item | Price | Qty | Total |
|------|-------|-----|-------|
| Pizza | 10.00 | 1 | 10.00 |
| Tax | 1.50 | 1 | 1.50 |
| Total | | | 11.50 |"
                .to_string(),
            receipt_total: Some(11.5),
            ..Default::default()
        };

        let session = SplitSession::from_analysis(&analysis);
        assert_eq!(session.items().len(), 2);
        assert_eq!(session.items()[0].item.name, "Pizza");
        assert_eq!(
            session.items()[1].item.kind,
            ItemKind::Special(SpecialKind::Tax)
        );
        // decimal-dot amounts, nothing else to go on: default currency
        assert_eq!(session.currency(), "EUR");
    }

    #[test]
    fn test_from_analysis_prefers_service_items() {
        let analysis = ReceiptAnalysis {
            raw_text: "ignored when items are present 99.99".to_string(),
            currency: Some("usd".to_string()),
            items: vec![
                LineItem::new("Ramen", 12.0, 1, 12.0),
                LineItem::new("Total", 12.0, 1, 12.0),
            ],
            ..Default::default()
        };

        let session = SplitSession::from_analysis(&analysis);
        assert_eq!(session.items().len(), 1);
        assert_eq!(session.items()[0].item.name, "Ramen");
        assert_eq!(session.currency(), "USD");
    }
}
