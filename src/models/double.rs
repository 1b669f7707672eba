use super::RankingModel;
use super::registry::Registry;
use super::surface::{SurfaceProfile, shrink};
use crate::data_processing::{AnnotatedMatch, MatchRecord};
use crate::error::{Error, Result};
use crate::numerical::ConfidenceTable;
use crate::systems::{Elo, Glicko2, Hyperparameters, ModifiedGlicko, RatingSystem, SkillEstimate};
use crate::tennis;
use std::collections::BTreeMap;

/// Two-sided confidence of the significance test on surface advantages.
pub const SURFACE_CONFIDENCE: f64 = 0.95;

/// Everything a double model remembers about one player.
#[derive(Clone, Debug)]
pub struct Competitor<R> {
    pub serve: R,
    pub ret: R,
    pub games: usize,
    pub surfaces: SurfaceProfile,
}

impl<R: SkillEstimate> Competitor<R> {
    /// The sum of serve and return strengths, by which leaderboards are sorted.
    pub fn total_strength(&self) -> f64 {
        self.serve.strength() + self.ret.strength()
    }
}

/// Rates every player twice: once as a server and once as a returner. Each match
/// is treated as two contests, A's serve against B's return and vice versa, whose
/// results are the observed serve percentages.
#[derive(Debug)]
pub struct DoubleRatingModel<S: RatingSystem> {
    name: &'static str,
    pub system: S,
    /// Shifts expected serve percentages up, since servers win most points.
    pub edge: f64,
    trainable: &'static [&'static str],
    surface_table: Option<ConfidenceTable>,
    players: Registry<Competitor<S::Rating>>,
}

pub type DoubleElo = DoubleRatingModel<Elo>;
pub type DoubleModifiedGlicko = DoubleRatingModel<ModifiedGlicko>;
pub type DoubleGlicko2 = DoubleRatingModel<Glicko2>;

impl DoubleRatingModel<Elo> {
    pub fn double_elo() -> Self {
        let system = Elo { mu: 1500., k: 11.35 };
        Self::new("double-elo", system, 0.1, &["K"])
    }

    /// Double Elo, with each serve percentage adjusted by the players'
    /// statistically significant surface advantages.
    pub fn double_elo_surface() -> Self {
        let mut model = Self::double_elo();
        model.name = "double-elo-surface";
        model.surface_table = Some(ConfidenceTable::new(SURFACE_CONFIDENCE));
        model
    }
}

impl DoubleRatingModel<ModifiedGlicko> {
    pub fn double_modified_glicko() -> Self {
        let system = ModifiedGlicko {
            mu: 1500.,
            sigma_start: 55.,
            sigma_cap: 45.7,
            c: 9.3,
            q: 0.0057565,
        };
        Self::new(
            "double-modified-glicko",
            system,
            0.,
            &["start_sigma", "end_sigma", "c"],
        )
    }
}

impl DoubleRatingModel<Glicko2> {
    pub fn double_glicko2() -> Self {
        Self::new(
            "double-glicko2",
            Glicko2::default(),
            0.,
            &["phi", "sigma", "tau"],
        )
    }
}

impl<S: RatingSystem + Hyperparameters> DoubleRatingModel<S> {
    pub fn new(
        name: &'static str,
        system: S,
        edge: f64,
        trainable: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            system,
            edge,
            trainable,
            surface_table: None,
            players: Registry::default(),
        }
    }

    pub fn new_competitor(&self) -> Competitor<S::Rating> {
        Competitor {
            serve: self.system.create_rating(),
            ret: self.system.create_rating(),
            games: 0,
            surfaces: SurfaceProfile::default(),
        }
    }

    pub fn uses_surfaces(&self) -> bool {
        self.surface_table.is_some()
    }

    pub fn competitor(&self, name: &str) -> Option<&Competitor<S::Rating>> {
        self.players.get(name)
    }

    pub fn competitors(&self) -> &Registry<Competitor<S::Rating>> {
        &self.players
    }

    pub fn games_played(&self, name: &str) -> usize {
        self.players.get(name).map_or(0, |player| player.games)
    }

    /// The `n` strongest players by serve plus return rating, strongest first.
    pub fn top_n(&self, n: usize) -> Vec<(&str, &Competitor<S::Rating>)> {
        let mut ranked: Vec<_> = self
            .players
            .iter()
            .map(|(name, player)| (name.as_str(), player))
            .collect();
        ranked.sort_by(|(a_name, a), (b_name, b)| {
            b.total_strength()
                .total_cmp(&a.total_strength())
                .then_with(|| a_name.cmp(b_name))
        });
        ranked.truncate(n);
        ranked
    }

    /// Expected serve percentages of the winner and the loser, before the edge.
    pub fn expected_serve_pcts(
        &self,
        winner: &Competitor<S::Rating>,
        loser: &Competitor<S::Rating>,
    ) -> (f64, f64) {
        (
            self.system.expect(&winner.serve, &loser.ret),
            self.system.expect(&loser.serve, &winner.ret),
        )
    }

    fn surface_adjustments(
        &self,
        a: &Competitor<S::Rating>,
        b: &Competitor<S::Rating>,
        surface: &str,
    ) -> (f64, f64) {
        let Some(table) = &self.surface_table else {
            return (0., 0.);
        };
        let adv_a = a.surfaces.advantage(surface, table);
        let adv_b = b.surfaces.advantage(surface, table);
        (
            shrink(adv_a.serve - adv_b.ret, adv_a.h_serve + adv_b.h_ret),
            shrink(adv_b.serve - adv_a.ret, adv_b.h_serve + adv_a.h_ret),
        )
    }

    /// Predicts and then applies one match between the checked-out records of its
    /// winner `a` and loser `b`. Returns the winner's predicted probability of
    /// winning and the bet weight of the prediction.
    pub fn transition(
        &self,
        a: &mut Competitor<S::Rating>,
        b: &mut Competitor<S::Rating>,
        record: &MatchRecord,
    ) -> (f64, f64) {
        let Some((wsp1, wsp2)) = record.serve_pcts() else {
            return (0.5, 0.);
        };

        let (adv_a, adv_b) = self.surface_adjustments(a, b, &record.surface);
        let (p, q) = self.expected_serve_pcts(a, b);
        let p = p + self.edge + adv_a;
        let q = q + self.edge + adv_b;
        let win_prob = tennis::match_probability(p, q, record.best_of);

        (a.serve, b.ret) = self.system.play_match(&a.serve, &b.ret, wsp1 - self.edge);
        (b.serve, a.ret) = self.system.play_match(&b.serve, &a.ret, wsp2 - self.edge);
        a.games += 1;
        b.games += 1;

        if self.uses_surfaces() {
            a.surfaces.update(wsp1, 1. - wsp2, &record.surface);
            b.surfaces.update(wsp2, 1. - wsp1, &record.surface);
        }
        (win_prob, 1.)
    }
}

impl<S: RatingSystem + Hyperparameters> RankingModel for DoubleRatingModel<S> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn params(&self) -> BTreeMap<&'static str, f64> {
        let mut params: BTreeMap<_, _> = self
            .system
            .param_names()
            .iter()
            .filter_map(|&name| Some((name, self.system.get_param(name)?)))
            .collect();
        params.insert("edge", self.edge);
        params
    }

    fn set_param(&mut self, name: &str, value: f64) -> Result<()> {
        if name == "edge" {
            self.edge = value;
        } else if !self.system.set_param(name, value) {
            return Err(Error::UnknownParam {
                model: self.name,
                param: name.to_owned(),
            });
        }
        Ok(())
    }

    fn trainable_names(&self) -> &'static [&'static str] {
        self.trainable
    }

    fn reset(&mut self) {
        self.players.clear();
    }

    fn run(&mut self, data: &[MatchRecord]) -> Vec<AnnotatedMatch> {
        let mut players = std::mem::take(&mut self.players);
        let annotated = data
            .iter()
            .map(|record| {
                let mut winner = players.checkout(&record.winner, || self.new_competitor());
                let mut loser = players.checkout(&record.loser, || self.new_competitor());
                let (win_prob, bet_amount) = self.transition(&mut winner, &mut loser, record);
                players.checkin(winner);
                players.checkin(loser);

                AnnotatedMatch {
                    record: record.clone(),
                    win_prob,
                    bet_amount,
                }
            })
            .collect();
        self.players = players;
        annotated
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 6, d).unwrap()
    }

    fn on_surface(mut record: MatchRecord, surface: &str) -> MatchRecord {
        record.surface = surface.to_owned();
        record
    }

    #[test]
    fn test_first_match_of_new_players() {
        let mut model = DoubleElo::double_elo();
        let record = MatchRecord::new("A", "B", Some((0.7, 0.55)), day(1));
        let annotated = model.run(&[record]);

        // Fresh ratings are level, so the edge alone sets both serve percentages
        let expected = tennis::match_probability(0.6, 0.6, 3);
        assert!((annotated[0].win_prob - expected).abs() < 1e-12);
        assert_eq!(annotated[0].bet_amount, 1.);

        let a = model.competitor("A").unwrap();
        let b = model.competitor("B").unwrap();
        let elo = &model.system;
        let base = elo.create_rating();
        let (a_serve, b_ret) = elo.play_match(&base, &base, 0.6);
        let (b_serve, a_ret) = elo.play_match(&base, &base, 0.45);
        let close = |x: f64, y: f64| (x - y).abs() < 1e-9;
        assert!(close(a.serve.rating, a_serve.rating));
        assert!(close(a.ret.rating, a_ret.rating));
        assert!(close(b.serve.rating, b_serve.rating));
        assert!(close(b.ret.rating, b_ret.rating));
        assert_eq!(model.games_played("A"), 1);
        assert_eq!(model.games_played("C"), 0);
    }

    #[test]
    fn test_missing_serve_stats() {
        let mut model = DoubleElo::double_elo();
        let played = MatchRecord::new("A", "B", Some((0.7, 0.55)), day(1));
        model.run(&[played]);
        let before = model.competitor("A").unwrap().clone();

        let missing = MatchRecord::new("A", "C", None, day(2));
        let annotated = model.run(&[missing]);
        assert_eq!(annotated[0].win_prob, 0.5);
        assert_eq!(annotated[0].bet_amount, 0.);

        let after = model.competitor("A").unwrap();
        assert_eq!(after.serve, before.serve);
        assert_eq!(after.ret, before.ret);
        assert_eq!(after.games, before.games);
        // The unseen player still gets a record
        assert_eq!(model.games_played("C"), 0);
        assert!(model.competitor("C").is_some());
    }

    #[test]
    fn test_params() {
        let mut model = DoubleModifiedGlicko::double_modified_glicko();
        let params = model.params();
        assert_eq!(params["start_sigma"], 55.);
        assert_eq!(params["end_sigma"], 45.7);
        assert_eq!(params["c"], 9.3);
        assert_eq!(params["edge"], 0.);
        assert_eq!(model.trainable_params(), vec![55., 45.7, 9.3]);

        model.set_param("edge", 0.05).unwrap();
        model.set_param("c", 4.).unwrap();
        assert_eq!(model.edge, 0.05);
        assert_eq!(model.system.c, 4.);
        assert!(model.set_param("K", 1.).is_err());

        let model = DoubleGlicko2::double_glicko2();
        assert_eq!(model.trainable_params(), vec![350., 0.06, 1.]);
        let model = DoubleElo::double_elo();
        assert_eq!(model.trainable_params(), vec![11.35]);
    }

    #[test]
    fn test_top_n() {
        let mut model = DoubleGlicko2::double_glicko2();
        let data: Vec<_> = (1..=20)
            .map(|d| MatchRecord::new("Strong", "Weak", Some((0.75, 0.5)), day(d)))
            .chain([MatchRecord::new("Middle", "Other", Some((0.6, 0.5)), day(21))])
            .collect();
        model.run(&data);

        let top: Vec<&str> = model.top_n(2).into_iter().map(|(name, _)| name).collect();
        assert_eq!(top, vec!["Strong", "Middle"]);
        assert_eq!(model.top_n(10).len(), 4);
        assert_eq!(model.games_played("Weak"), 20);
    }

    #[test]
    fn test_surface_correction_needs_evidence() {
        let data: Vec<_> = (1..=10)
            .map(|d| {
                let record = MatchRecord::new("A", "B", Some((0.65, 0.6)), day(d));
                on_surface(record, "Clay")
            })
            .collect();

        // With few matches per surface, both variants predict identically
        let mut plain = DoubleElo::double_elo();
        let mut surface = DoubleElo::double_elo_surface();
        let plain_probs: Vec<f64> = plain.run(&data[..6]).iter().map(|m| m.win_prob).collect();
        let surface_probs: Vec<f64> = surface.run(&data[..6]).iter().map(|m| m.win_prob).collect();
        assert_eq!(plain_probs, surface_probs);

        let stats = surface.competitor("A").unwrap().surfaces.surface("Clay");
        assert_eq!(stats.n, 6);
        assert!(plain.competitor("A").unwrap().surfaces.overall().n == 0);

        // Playing only on one surface never creates an advantage over the average
        let plain_probs: Vec<f64> = plain.run(&data[6..]).iter().map(|m| m.win_prob).collect();
        let surface_probs: Vec<f64> = surface.run(&data[6..]).iter().map(|m| m.win_prob).collect();
        for (x, y) in plain_probs.iter().zip(&surface_probs) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_surface_specialist_is_favored() {
        let mut model = DoubleElo::double_elo_surface();
        let mut data = vec![];
        for d in 1..=10 {
            let grass = MatchRecord::new("Specialist", "Rival", Some((0.8, 0.6)), day(d));
            data.push(on_surface(grass, "Grass"));
            let clay = MatchRecord::new("Rival", "Specialist", Some((0.7, 0.5)), day(d));
            data.push(on_surface(clay, "Clay"));
        }
        model.run(&data);

        let specialist = model.competitor("Specialist").unwrap();
        let rival = model.competitor("Rival").unwrap();
        let (on_grass, _) = model.surface_adjustments(specialist, rival, "Grass");
        let (on_clay, _) = model.surface_adjustments(specialist, rival, "Clay");
        assert!(on_grass > 0.);
        assert!(on_clay < 0.);
    }
}
