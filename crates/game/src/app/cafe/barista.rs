use engine::{TextureHandle, Vec2};
use thiserror::Error;
use tracing::debug;

use super::motion::{Body, IdleSway};
use super::order::Order;
use crate::app::config::MenuConfig;

pub(crate) const BARISTA_HALF_EXTENTS: Vec2 = Vec2::new(16.0, 32.0);

const ASK_DRINK_TEXT: &str = "Welcome! What can I get started for you?";
const ASK_SIZE_TEXT: &str = "Great choice! What size would you like?";
const ASK_MILK_TEXT: &str = "Any milk preference today?";
const ASK_NAME_TEXT: &str = "Perfect. Name for the order?";
const CONFIRM_OPTION: &str = "Sounds great!";
const COMPLETE_TEXT: &str = "Your order is on its way! Feel free to take a seat.";
const COMPLETE_OPTION: &str = "Thanks!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum ConversationState {
    #[default]
    Idle,
    AskDrink,
    AskSize,
    AskMilk,
    AskName,
    Confirm,
    Complete,
}

impl ConversationState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AskDrink => "ask_drink",
            Self::AskSize => "ask_size",
            Self::AskMilk => "ask_milk",
            Self::AskName => "ask_name",
            Self::Confirm => "confirm",
            Self::Complete => "complete",
        }
    }
}

/// What the barista says in the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Prompt {
    pub(crate) text: String,
    pub(crate) options: Vec<String>,
    pub(crate) requires_input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ConversationError {
    #[error("option {index} is out of range for {option_count} options in state {}", .state.as_str())]
    OptionOutOfRange {
        index: usize,
        option_count: usize,
        state: ConversationState,
    },
}

/// Ordering dialogue state machine. Owns the order being taken.
#[derive(Debug, Clone)]
pub(crate) struct BaristaConversation {
    menu: MenuConfig,
    state: ConversationState,
    order: Order,
    prompt: Prompt,
}

impl BaristaConversation {
    pub(crate) fn new(menu: MenuConfig) -> Self {
        Self {
            menu,
            state: ConversationState::Idle,
            order: Order::default(),
            prompt: Prompt::default(),
        }
    }

    pub(crate) fn state(&self) -> ConversationState {
        self.state
    }

    pub(crate) fn order(&self) -> &Order {
        &self.order
    }

    pub(crate) fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub(crate) fn requires_input(&self) -> bool {
        self.prompt.requires_input
    }

    pub(crate) fn is_conversation_active(&self) -> bool {
        !matches!(
            self.state,
            ConversationState::Idle | ConversationState::Complete
        )
    }

    pub(crate) fn start(&mut self) {
        self.order.clear();
        self.enter(ConversationState::AskDrink);
    }

    pub(crate) fn reset(&mut self) {
        self.order.clear();
        self.enter(ConversationState::Idle);
    }

    /// Picks option `index` of the current prompt. An out-of-range index
    /// changes nothing.
    pub(crate) fn select_option(&mut self, index: usize) -> Result<(), ConversationError> {
        let Some(choice) = self.prompt.options.get(index).cloned() else {
            return Err(ConversationError::OptionOutOfRange {
                index,
                option_count: self.prompt.options.len(),
                state: self.state,
            });
        };

        match self.state {
            ConversationState::AskDrink => {
                self.order.drink = choice;
                self.enter(ConversationState::AskSize);
            }
            ConversationState::AskSize => {
                self.order.size = choice;
                self.enter(ConversationState::AskMilk);
            }
            ConversationState::AskMilk => {
                self.order.milk = choice;
                self.enter(ConversationState::AskName);
            }
            ConversationState::Confirm => self.enter(ConversationState::Complete),
            ConversationState::Complete
            | ConversationState::Idle
            | ConversationState::AskName => {}
        }
        Ok(())
    }

    /// Returns false, changing nothing, outside `AskName` or for a blank name.
    pub(crate) fn submit_name(&mut self, name: &str) -> bool {
        let name = name.trim();
        if self.state != ConversationState::AskName || name.is_empty() {
            return false;
        }
        self.order.customer_name = name.to_string();
        self.enter(ConversationState::Confirm);
        true
    }

    fn enter(&mut self, state: ConversationState) {
        let from = self.state;
        self.state = state;
        self.prompt = self.build_prompt();
        debug!(
            from = from.as_str(),
            to = state.as_str(),
            "conversation_state_changed"
        );
    }

    fn build_prompt(&self) -> Prompt {
        match self.state {
            ConversationState::Idle => Prompt::default(),
            ConversationState::AskDrink => choices(ASK_DRINK_TEXT, &self.menu.drinks),
            ConversationState::AskSize => choices(ASK_SIZE_TEXT, &self.menu.sizes),
            ConversationState::AskMilk => choices(ASK_MILK_TEXT, &self.menu.milks),
            ConversationState::AskName => Prompt {
                text: ASK_NAME_TEXT.to_string(),
                options: Vec::new(),
                requires_input: true,
            },
            ConversationState::Confirm => Prompt {
                text: format!(
                    "Awesome! A {} {} with {} for {}.",
                    self.order.size, self.order.drink, self.order.milk, self.order.customer_name
                ),
                options: vec![CONFIRM_OPTION.to_string()],
                requires_input: false,
            },
            ConversationState::Complete => Prompt {
                text: COMPLETE_TEXT.to_string(),
                options: vec![COMPLETE_OPTION.to_string()],
                requires_input: false,
            },
        }
    }
}

fn choices(text: &str, options: &[String]) -> Prompt {
    Prompt {
        text: text.to_string(),
        options: options.to_vec(),
        requires_input: false,
    }
}

/// The barista behind the counter: sways in place and runs the conversation.
#[derive(Debug, Clone)]
pub(crate) struct BaristaNpc {
    pub(crate) body: Body,
    sway: IdleSway,
    pub(crate) conversation: BaristaConversation,
}

impl BaristaNpc {
    pub(crate) fn new(position: Vec2, sprite: TextureHandle, menu: MenuConfig) -> Self {
        Self {
            body: Body::new(position, BARISTA_HALF_EXTENTS, sprite),
            sway: IdleSway::new(position),
            conversation: BaristaConversation::new(menu),
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.body.position
    }

    pub(crate) fn update(&mut self, dt: f32) {
        self.body.position = self.sway.update(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> BaristaConversation {
        BaristaConversation::new(MenuConfig::default())
    }

    #[test]
    fn new_conversation_is_idle_with_empty_prompt() {
        let conversation = conversation();
        assert_eq!(conversation.state(), ConversationState::Idle);
        assert!(!conversation.is_conversation_active());
        assert_eq!(conversation.prompt(), &Prompt::default());
    }

    #[test]
    fn full_flow_visits_every_state_in_order() {
        let mut conversation = conversation();
        conversation.start();
        assert_eq!(conversation.state(), ConversationState::AskDrink);
        assert_eq!(conversation.prompt().text, ASK_DRINK_TEXT);
        assert_eq!(conversation.prompt().options, MenuConfig::default().drinks);

        conversation.select_option(0).expect("drink");
        assert_eq!(conversation.state(), ConversationState::AskSize);
        conversation.select_option(1).expect("size");
        assert_eq!(conversation.state(), ConversationState::AskMilk);
        conversation.select_option(2).expect("milk");
        assert_eq!(conversation.state(), ConversationState::AskName);
        assert!(conversation.requires_input());
        assert!(conversation.prompt().options.is_empty());

        assert!(conversation.submit_name("  Sam  "));
        assert_eq!(conversation.state(), ConversationState::Confirm);
        assert_eq!(
            conversation.prompt().text,
            "Awesome! A Medium Latte with Almond Milk for Sam."
        );
        assert_eq!(conversation.prompt().options, vec![CONFIRM_OPTION]);
        assert!(conversation.is_conversation_active());

        conversation.select_option(0).expect("confirm");
        assert_eq!(conversation.state(), ConversationState::Complete);
        assert!(!conversation.is_conversation_active());
        assert_eq!(conversation.prompt().text, COMPLETE_TEXT);

        let order = conversation.order();
        assert_eq!(order.drink, "Latte");
        assert_eq!(order.size, "Medium");
        assert_eq!(order.milk, "Almond Milk");
        assert_eq!(order.customer_name, "Sam");
        assert!(order.is_complete());
    }

    #[test]
    fn out_of_range_selection_changes_nothing() {
        let mut conversation = conversation();
        conversation.start();
        conversation.select_option(3).expect("drink");
        let prompt = conversation.prompt().clone();

        let error = conversation.select_option(3).expect_err("only three sizes");
        assert_eq!(
            error,
            ConversationError::OptionOutOfRange {
                index: 3,
                option_count: 3,
                state: ConversationState::AskSize,
            }
        );
        assert_eq!(conversation.state(), ConversationState::AskSize);
        assert_eq!(conversation.prompt(), &prompt);
        assert_eq!(conversation.order().drink, "Mocha");
        assert!(conversation.order().size.is_empty());
    }

    #[test]
    fn selection_while_idle_or_naming_is_rejected() {
        let mut conversation = conversation();
        assert!(conversation.select_option(0).is_err());

        conversation.start();
        for _ in 0..3 {
            conversation.select_option(0).expect("select");
        }
        assert_eq!(conversation.state(), ConversationState::AskName);
        assert!(conversation.select_option(0).is_err());
        assert_eq!(conversation.state(), ConversationState::AskName);
    }

    #[test]
    fn name_submission_outside_ask_name_or_blank_is_ignored() {
        let mut conversation = conversation();
        assert!(!conversation.submit_name("Sam"));

        conversation.start();
        assert!(!conversation.submit_name("Sam"));
        assert_eq!(conversation.state(), ConversationState::AskDrink);

        for _ in 0..3 {
            conversation.select_option(0).expect("select");
        }
        assert!(!conversation.submit_name("   "));
        assert_eq!(conversation.state(), ConversationState::AskName);
        assert!(conversation.order().customer_name.is_empty());
    }

    #[test]
    fn complete_accepts_selection_without_transition() {
        let mut conversation = conversation();
        conversation.start();
        for _ in 0..3 {
            conversation.select_option(0).expect("select");
        }
        assert!(conversation.submit_name("Ana"));
        conversation.select_option(0).expect("confirm");

        conversation.select_option(0).expect("thanks");
        assert_eq!(conversation.state(), ConversationState::Complete);
    }

    #[test]
    fn start_and_reset_clear_previous_order() {
        let mut conversation = conversation();
        conversation.start();
        conversation.select_option(1).expect("drink");
        conversation.start();
        assert_eq!(conversation.order(), &Order::default());
        assert_eq!(conversation.state(), ConversationState::AskDrink);

        conversation.select_option(1).expect("drink");
        conversation.reset();
        assert_eq!(conversation.order(), &Order::default());
        assert_eq!(conversation.state(), ConversationState::Idle);
        assert_eq!(conversation.prompt(), &Prompt::default());
    }
}
