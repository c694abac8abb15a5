use yew::prelude::*;
use web_sys::{HtmlInputElement, HtmlSelectElement};

use crate::validation::US_STATES;

/// A simple, styled button.
#[derive(Properties, PartialEq)]
pub struct ButtonProps {
    /// Button label text
    pub label: String,
    /// Click handler
    pub onclick: Callback<MouseEvent>,
    /// Disable state
    #[prop_or_default]
    pub disabled: bool,
}

#[function_component(Button)]
pub fn button(props: &ButtonProps) -> Html {
    html! {
        <button
            type="button"
            onclick={props.onclick.clone()}
            disabled={props.disabled}
            class="ycc-button"
        >
            { &props.label }
        </button>
    }
}

/// A basic controlled text input.
#[derive(Properties, PartialEq)]
pub struct TextInputProps {
    /// Current value
    pub value: String,
    /// Emits new value on each keystroke
    pub oninput: Callback<String>,
    /// Placeholder text
    #[prop_or_default]
    pub placeholder: String,
    /// Disable state (set while consent is granted)
    #[prop_or_default]
    pub disabled: bool,
    #[prop_or_default]
    pub id: Option<String>,
}

#[function_component(TextInput)]
pub fn text_input(props: &TextInputProps) -> Html {
    let oninput = props.oninput.clone();
    html! {
        <input
            type="text"
            class="ycc-text-input"
            id={props.id.clone()}
            value={props.value.clone()}
            placeholder={props.placeholder.clone()}
            disabled={props.disabled}
            oninput={Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                oninput.emit(input.value());
            })}
        />
    }
}

/// A controlled `<select>` over the US state/territory abbreviations, with a
/// disabled placeholder entry while nothing is chosen.
#[derive(Properties, PartialEq)]
pub struct StateSelectProps {
    /// Currently selected abbreviation, or empty
    pub value: String,
    /// Emits the newly selected abbreviation
    pub onchange: Callback<String>,
    #[prop_or_default]
    pub disabled: bool,
    #[prop_or_default]
    pub id: Option<String>,
}

#[function_component(StateSelect)]
pub fn state_select(props: &StateSelectProps) -> Html {
    let onchange = props.onchange.clone();
    html! {
        <select
            class="ycc-state-select"
            id={props.id.clone()}
            disabled={props.disabled}
            onchange={Callback::from(move |e: Event| {
                let select: HtmlSelectElement = e.target_unchecked_into();
                onchange.emit(select.value());
            })}
        >
            <option value="" disabled={true} selected={props.value.is_empty()}>
                { "Select State" }
            </option>
            {
                for US_STATES.iter().map(|(abbr, name)| html! {
                    <option value={*abbr} selected={props.value == *abbr}>
                        { *name }
                    </option>
                })
            }
        </select>
    }
}
