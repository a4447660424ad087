/// Negotiation progress of one peer link.
///
/// ```text
/// Idle --CreateOffer--> AwaitingLocalOffer --OfferSent--> OfferSent --AnswerReceived--> Connected
/// Idle --OfferReceived--> AnswerSent --AnswerSent--> Connected
/// (live) --RemoteClosed | LocalClose--> Closed
/// (live) --TransportError--> Failed
/// AwaitingLocalOffer | OfferSent --NegotiationTimeout--> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    AwaitingLocalOffer,
    OfferSent,
    AnswerSent,
    Connected,
    Closed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    CreateOffer,
    OfferSent,
    AnswerReceived,
    OfferReceived,
    AnswerSent,
    RemoteClosed,
    LocalClose,
    TransportError,
    NegotiationTimeout,
}

impl NegotiationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, NegotiationState::Closed | NegotiationState::Failed)
    }

    /// States covered by the negotiation timer.
    pub fn is_offering(self) -> bool {
        matches!(
            self,
            NegotiationState::AwaitingLocalOffer | NegotiationState::OfferSent
        )
    }

    /// The state after `event`, or `None` if the event is not valid here.
    pub fn next(self, event: LinkEvent) -> Option<NegotiationState> {
        use LinkEvent as E;
        use NegotiationState as S;

        if self.is_terminal() {
            return None;
        }

        match (self, event) {
            (_, E::RemoteClosed | E::LocalClose) => Some(S::Closed),
            (_, E::TransportError) => Some(S::Failed),
            (S::AwaitingLocalOffer | S::OfferSent, E::NegotiationTimeout) => Some(S::Failed),
            (S::Idle, E::CreateOffer) => Some(S::AwaitingLocalOffer),
            (S::AwaitingLocalOffer, E::OfferSent) => Some(S::OfferSent),
            (S::OfferSent, E::AnswerReceived) => Some(S::Connected),
            (S::Idle, E::OfferReceived) => Some(S::AnswerSent),
            (S::AnswerSent, E::AnswerSent) => Some(S::Connected),
            _ => None,
        }
    }
}
