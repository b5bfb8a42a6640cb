use thiserror::Error;

/// Ошибки правил игры: действие недопустимо в текущем состоянии раунда.
///
/// Никакая из этих ошибок не сопровождается мутацией состояния.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("Действие относится к другой игре")]
    WrongGame,

    #[error("Раунд уже завершён")]
    RoundOver,

    #[error("Место {0} не существует за столом")]
    UnknownSeat(usize),

    #[error("Сейчас не ход места {0}")]
    NotYourTurn(usize),

    #[error("Игрок уже закончил свой ход")]
    SeatDone,

    #[error("Дабл возможен только на двух картах")]
    CannotDouble,

    #[error("Сплит невозможен для этой руки")]
    CannotSplit,

    #[error("Страховка сейчас недоступна")]
    InsuranceUnavailable,

    #[error("В шу не осталось карт")]
    DeckExhausted,

    #[error("Кости уже брошены")]
    AlreadyRolled,

    #[error("Нечего перебрасывать: нет мэнаши")]
    NoPendingMenashi,

    #[error("Лимит перебросов исчерпан")]
    RerollLimit,

    #[error("Невозможно выполнить check – нужно хотя бы уравнять ставку")]
    CannotCheck,

    #[error("Невозможно выполнить call – нет ставки для уравнивания")]
    CannotCall,

    #[error("Размер рейза слишком мал")]
    RaiseTooSmall,
}
