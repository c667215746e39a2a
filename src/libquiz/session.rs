use log::{debug, warn};

use crate::libquiz::cache::QuestionCache;
use crate::libquiz::fetch::{FetchError, QuestionSource};
use crate::libquiz::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Error,
    InProgress,
    Completed,
}

/// One run through a fixed question batch. The option order is shuffled once
/// when a question becomes current and held fixed until `advance`.
#[derive(Debug)]
pub struct Session {
    questions: Vec<Question>,
    current: usize,
    selected: Option<String>,
    score: u32,
    phase: Phase,
    options: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            questions: Vec::new(),
            current: 0,
            selected: None,
            score: 0,
            phase: Phase::Loading,
            options: Vec::new(),
        }
    }

    pub fn begin(&mut self, questions: Vec<Question>) {
        if questions.is_empty() {
            warn!("[Session] Refusing to start with an empty batch.");
            self.fail();
            return;
        }
        self.reset();
        self.options = questions[0].options_randomized();
        self.questions = questions;
        self.phase = Phase::InProgress;
    }

    pub fn fail(&mut self) {
        self.phase = Phase::Error;
    }

    pub fn reset(&mut self) {
        *self = Session::new();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn answered(&self) -> bool {
        self.selected.is_some()
    }

    pub fn progress_percent(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        ((self.current + 1) * 100 / self.questions.len()) as u32
    }

    /// Records `option` verbatim and scores it on an exact match. The first
    /// answer wins: re-submitting is ignored, so at most one scoring event
    /// happens per question. `None` means the call was ignored.
    pub fn submit_answer(&mut self, option: &str) -> Option<bool> {
        if self.phase != Phase::InProgress || self.selected.is_some() {
            debug!("[Session] Ignoring answer {:?}.", option);
            return None;
        }
        self.selected = Some(option.to_string());
        let correct = self.questions[self.current].correct_answer == option;
        if correct {
            self.score += 1;
        }
        Some(correct)
    }

    /// Moves past the current question once it has an answer: next question
    /// with a fresh shuffle, or `Completed` from the last one. False when
    /// nothing was recorded yet.
    pub fn advance(&mut self) -> bool {
        if self.phase != Phase::InProgress || self.selected.is_none() {
            return false;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
            self.options = self.questions[self.current].options_randomized();
        } else {
            self.phase = Phase::Completed;
        }
        true
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the session plus its two collaborators, the question cache and the
/// remote source. Every fetch failure lands in the `Error` phase; nothing
/// escapes past here.
pub struct Controller<C, S> {
    cache: C,
    source: S,
    session: Session,
    last_error: Option<FetchError>,
}

impl<C: QuestionCache, S: QuestionSource> Controller<C, S> {
    pub fn new(cache: C, source: S) -> Self {
        Self {
            cache,
            source,
            session: Session::new(),
            last_error: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Cache hit starts the session directly; otherwise one fetch is issued
    /// and a successful batch is persisted back to the cache.
    pub async fn init(&mut self) {
        self.last_error = None;
        if let Some(cached) = self.cache.load() {
            debug!("[Setup] Starting from {} cached questions.", cached.len());
            self.session.begin(cached);
            return;
        }
        match self.source.fetch().await {
            Ok(questions) => {
                debug!("[Setup] Fetched {} questions.", questions.len());
                self.cache.save(&questions);
                self.session.begin(questions);
            }
            Err(err) => {
                warn!("[Setup] Could not fetch questions: {}", err);
                self.last_error = Some(err);
                self.session.fail();
            }
        }
    }

    /// Cache is cleared first, so this always goes to the network.
    pub async fn restart(&mut self) {
        self.cache.clear();
        self.session.reset();
        self.init().await;
    }

    /// Manual retry: the full init protocol again, cache read included.
    pub async fn reload(&mut self) {
        self.session.reset();
        self.init().await;
    }

    pub fn submit_answer(&mut self, option: &str) -> Option<bool> {
        self.session.submit_answer(option)
    }

    pub fn advance(&mut self) -> bool {
        self.session.advance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    fn question(n: usize) -> Question {
        Question {
            text: format!("Question {n}?"),
            correct_answer: format!("right {n}"),
            incorrect_answers: vec![
                format!("wrong {n}a"),
                format!("wrong {n}b"),
                format!("wrong {n}c"),
            ],
        }
    }

    fn batch(n: usize) -> Vec<Question> {
        (0..n).map(question).collect()
    }

    fn in_progress(n: usize) -> Session {
        let mut session = Session::new();
        session.begin(batch(n));
        session
    }

    #[derive(Default)]
    struct FakeCache {
        stored: RefCell<Option<Vec<Question>>>,
    }

    impl FakeCache {
        fn warm(questions: Vec<Question>) -> Self {
            Self {
                stored: RefCell::new(Some(questions)),
            }
        }

        fn stored(&self) -> Option<Vec<Question>> {
            self.stored.borrow().clone()
        }
    }

    impl QuestionCache for FakeCache {
        fn load(&self) -> Option<Vec<Question>> {
            self.stored.borrow().clone()
        }

        fn save(&self, questions: &[Question]) {
            *self.stored.borrow_mut() = Some(questions.to_vec());
        }

        fn clear(&self) {
            *self.stored.borrow_mut() = None;
        }
    }

    struct FakeSource {
        responses: RefCell<VecDeque<Result<Vec<Question>, FetchError>>>,
        calls: RefCell<u32>,
    }

    impl FakeSource {
        fn new(responses: Vec<Result<Vec<Question>, FetchError>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(0),
            }
        }

        fn unreachable() -> Self {
            Self::new(vec![])
        }

        fn calls(&self) -> u32 {
            *self.calls.borrow()
        }
    }

    impl QuestionSource for FakeSource {
        async fn fetch(&self) -> Result<Vec<Question>, FetchError> {
            *self.calls.borrow_mut() += 1;
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("no fetch expected")
        }
    }

    #[test]
    fn new_session_is_loading_and_empty() {
        let session = Session::new();
        assert_eq!(session.phase(), Phase::Loading);
        assert!(session.is_empty());
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.progress_percent(), 0);
    }

    #[test]
    fn beginning_an_empty_batch_fails() {
        let mut session = Session::new();
        session.begin(vec![]);
        assert_eq!(session.phase(), Phase::Error);
    }

    #[test]
    fn correct_answer_scores_once() {
        let mut session = in_progress(3);
        assert_eq!(session.submit_answer("right 0"), Some(true));
        assert_eq!(session.score(), 1);
        assert_eq!(session.selected_answer(), Some("right 0"));

        // First answer wins, the second submit changes nothing.
        assert_eq!(session.submit_answer("wrong 0a"), None);
        assert_eq!(session.score(), 1);
        assert_eq!(session.selected_answer(), Some("right 0"));
    }

    #[test]
    fn wrong_answer_records_without_scoring() {
        let mut session = in_progress(3);
        assert_eq!(session.submit_answer("wrong 0b"), Some(false));
        assert_eq!(session.score(), 0);
        assert_eq!(session.selected_answer(), Some("wrong 0b"));
    }

    #[test]
    fn off_list_answer_records_the_given_value() {
        let mut session = in_progress(3);
        assert_eq!(session.submit_answer("not an option"), Some(false));
        assert_eq!(session.score(), 0);
        assert_eq!(session.selected_answer(), Some("not an option"));
    }

    #[test]
    fn advance_requires_a_recorded_answer() {
        let mut session = in_progress(3);
        assert!(!session.advance());
        assert_eq!(session.current_index(), 0);

        session.submit_answer("right 0");
        assert!(session.advance());
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.selected_answer(), None);
    }

    #[test]
    fn advance_from_the_last_question_completes() {
        let mut session = in_progress(2);
        session.submit_answer("right 0");
        session.advance();
        session.submit_answer("right 1");
        assert!(session.advance());
        assert_eq!(session.phase(), Phase::Completed);
        // Index stays on the last question.
        assert_eq!(session.current_index(), 1);
        assert!(!session.advance());
    }

    #[test]
    fn score_never_exceeds_answered_count() {
        let mut session = in_progress(5);
        for idx in 0..5 {
            session.submit_answer(&format!("right {idx}"));
            assert!(session.score() as usize <= session.current_index() + 1);
            session.advance();
        }
    }

    #[test]
    fn answering_all_ten_correctly_scores_ten() {
        let mut session = in_progress(10);
        for idx in 0..10 {
            assert_eq!(session.submit_answer(&format!("right {idx}")), Some(true));
            session.advance();
        }
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.score(), 10);
    }

    #[test]
    fn progress_percent_tracks_the_current_question() {
        let mut session = in_progress(10);
        assert_eq!(session.progress_percent(), 10);
        session.submit_answer("right 0");
        session.advance();
        assert_eq!(session.progress_percent(), 20);
        for idx in 1..10 {
            session.submit_answer(&format!("right {idx}"));
            session.advance();
        }
        assert_eq!(session.progress_percent(), 100);
    }

    #[test]
    fn options_cover_all_answers_and_hold_still_until_advance() {
        let mut session = in_progress(2);
        let held = session.options().to_vec();
        let mut sorted = held.clone();
        sorted.sort();
        let mut expected = batch(2)[0].all_options();
        expected.sort();
        assert_eq!(sorted, expected);

        // Re-reading does not reshuffle.
        assert_eq!(session.options(), held.as_slice());
        assert_eq!(session.options(), held.as_slice());

        session.submit_answer("right 0");
        session.advance();
        let mut next = session.options().to_vec();
        next.sort();
        let mut expected = batch(2)[1].all_options();
        expected.sort();
        assert_eq!(next, expected);
    }

    #[test]
    fn reset_returns_to_initial_values() {
        let mut session = in_progress(3);
        session.submit_answer("right 0");
        session.advance();
        session.reset();
        assert_eq!(session.phase(), Phase::Loading);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.selected_answer(), None);
        assert!(session.is_empty());
    }

    #[tokio::test]
    async fn init_prefers_the_cache_and_skips_the_network() {
        let mut controller =
            Controller::new(FakeCache::warm(batch(10)), FakeSource::unreachable());
        controller.init().await;
        assert_eq!(controller.session().phase(), Phase::InProgress);
        assert_eq!(controller.session().current_index(), 0);
        assert_eq!(controller.session().len(), 10);
    }

    #[tokio::test]
    async fn init_fetches_on_a_cold_cache_and_persists_the_batch() {
        let source = FakeSource::new(vec![Ok(batch(10))]);
        let mut controller = Controller::new(FakeCache::default(), source);
        controller.init().await;
        assert_eq!(controller.session().phase(), Phase::InProgress);
        assert_eq!(controller.session().len(), 10);
        assert_eq!(controller.cache.stored(), Some(batch(10)));
        assert_eq!(controller.source.calls(), 1);
    }

    #[tokio::test]
    async fn rate_limited_fetch_lands_in_the_error_phase() {
        let source = FakeSource::new(vec![Err(FetchError::RateLimited)]);
        let mut controller = Controller::new(FakeCache::default(), source);
        controller.init().await;
        assert_eq!(controller.session().phase(), Phase::Error);
        assert!(controller.session().is_empty());
        assert!(matches!(
            controller.last_error(),
            Some(FetchError::RateLimited)
        ));
        assert_eq!(controller.cache.stored(), None);
    }

    #[tokio::test]
    async fn empty_payload_lands_in_the_error_phase() {
        let source = FakeSource::new(vec![Err(FetchError::EmptyPayload)]);
        let mut controller = Controller::new(FakeCache::default(), source);
        controller.init().await;
        assert_eq!(controller.session().phase(), Phase::Error);
        assert!(controller.session().is_empty());
    }

    #[tokio::test]
    async fn restart_clears_the_cache_and_always_refetches() {
        let source = FakeSource::new(vec![Ok(batch(10))]);
        let mut controller = Controller::new(FakeCache::warm(batch(10)), source);
        controller.init().await;
        assert_eq!(controller.source.calls(), 0);

        controller.submit_answer("right 0");
        controller.advance();
        controller.restart().await;

        assert_eq!(controller.source.calls(), 1);
        assert_eq!(controller.session().phase(), Phase::InProgress);
        assert_eq!(controller.session().score(), 0);
        assert_eq!(controller.session().current_index(), 0);
        assert_eq!(controller.session().selected_answer(), None);
        assert_eq!(controller.cache.stored(), Some(batch(10)));
    }

    #[tokio::test]
    async fn reload_retries_after_an_error_and_clears_it_on_success() {
        let source = FakeSource::new(vec![Err(FetchError::RateLimited), Ok(batch(10))]);
        let mut controller = Controller::new(FakeCache::default(), source);
        controller.init().await;
        assert_eq!(controller.session().phase(), Phase::Error);

        controller.reload().await;
        assert_eq!(controller.session().phase(), Phase::InProgress);
        assert!(controller.last_error().is_none());
        assert_eq!(controller.source.calls(), 2);
    }

    #[tokio::test]
    async fn reload_uses_a_still_warm_cache_without_fetching() {
        let mut controller =
            Controller::new(FakeCache::warm(batch(10)), FakeSource::unreachable());
        controller.init().await;
        controller.reload().await;
        assert_eq!(controller.session().phase(), Phase::InProgress);
        assert_eq!(controller.source.calls(), 0);
    }
}
