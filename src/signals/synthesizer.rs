// =============================================================================
// Signal Synthesizer — indicator vote tally
// =============================================================================
//
// Single pass over the indicators in a fixed order:
//
//   1. RSI       oversold => buy,  overbought => sell
//   2. MACD      MACD > signal => buy,  MACD < signal => sell
//   3. Bands     close < lower => buy,  close > upper => sell
//   4. Trend     bullish => buy,  bearish => sell
//   5. EMA cross (optional) fast > slow => buy,  fast < slow => sell
//
// An indicator that is missing does not vote.  Ties within a relative
// tolerance of price are neutral, so a flat market never votes.
//
// Recommendation: buy if buy votes beat sell votes by at least `vote_margin`,
// sell if mirrored, hold otherwise.
//
// Confidence = share of voters agreeing with the recommendation (neutral
// voters agree with hold) * 100, scaled by 0.5 + 0.5 * trend confidence / 100,
// then capped by data quality and clamped to [0, 100].
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine_config::SignalParams;
use crate::indicators::IndicatorSet;
use crate::trend::TrendAnalysis;
use crate::types::{AnalysisQuality, Recommendation, Strength, Trend};

/// Comparisons closer than this fraction of price count as equal.
const TIE_TOLERANCE: f64 = 1e-9;

/// Direction of a single indicator vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Buy,
    Sell,
    Neutral,
}

/// One indicator's contribution to the tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorVote {
    pub indicator: String,
    pub vote: VoteDirection,
}

/// Levels a reader is most likely to act on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
}

/// Result of the synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub trend: Trend,
    pub strength: Strength,
    pub recommendation: Recommendation,
    /// [0, 100]
    pub confidence: f64,
    pub key_levels: KeyLevels,
    /// One message per non-neutral vote, in evaluation order.
    pub signals: Vec<String>,
    /// Every vote cast, in evaluation order.
    pub votes: Vec<IndicatorVote>,
}

/// The vote-tally engine.
pub struct SignalSynthesizer {
    params: SignalParams,
}

impl SignalSynthesizer {
    /// A `vote_margin` of zero is raised to 1; with no margin an empty tally
    /// would read as a buy.
    pub fn new(mut params: SignalParams) -> Self {
        params.vote_margin = params.vote_margin.max(1);
        Self { params }
    }

    /// Fuse indicators and trend into a recommendation.  Never fails.
    pub fn synthesize(
        &self,
        indicators: &IndicatorSet,
        trend: &TrendAnalysis,
        close: f64,
        quality: AnalysisQuality,
    ) -> SignalResult {
        let tolerance = close.abs() * TIE_TOLERANCE;
        let mut ballot = Ballot::default();

        // ── 1. RSI ───────────────────────────────────────────────────────
        if let Some(rsi) = indicators.rsi {
            if rsi < self.params.rsi_oversold {
                ballot.cast(
                    "rsi",
                    VoteDirection::Buy,
                    format!("RSI at {rsi:.1} indicates oversold conditions"),
                );
            } else if rsi > self.params.rsi_overbought {
                ballot.cast(
                    "rsi",
                    VoteDirection::Sell,
                    format!("RSI at {rsi:.1} indicates overbought conditions"),
                );
            } else {
                ballot.abstain("rsi");
            }
        }

        // ── 2. MACD ──────────────────────────────────────────────────────
        if let (Some(macd), Some(signal)) = (indicators.macd, indicators.macd_signal) {
            let diff = macd - signal;
            if diff > tolerance {
                ballot.cast("macd", VoteDirection::Buy, "MACD shows bullish momentum".to_string());
            } else if diff < -tolerance {
                ballot.cast("macd", VoteDirection::Sell, "MACD shows bearish momentum".to_string());
            } else {
                ballot.abstain("macd");
            }
        }

        // ── 3. Bollinger Bands ───────────────────────────────────────────
        if let Some(bb) = indicators.bollinger_bands {
            if close < bb.lower - tolerance {
                ballot.cast(
                    "bollinger_bands",
                    VoteDirection::Buy,
                    "Price below lower Bollinger Band - potential bounce".to_string(),
                );
            } else if close > bb.upper + tolerance {
                ballot.cast(
                    "bollinger_bands",
                    VoteDirection::Sell,
                    "Price above upper Bollinger Band - potential reversal".to_string(),
                );
            } else {
                ballot.abstain("bollinger_bands");
            }
        }

        // ── 4. Trend ─────────────────────────────────────────────────────
        match trend.trend {
            Trend::Bullish => ballot.cast(
                "trend",
                VoteDirection::Buy,
                format!("{} bullish trend", capitalize(trend.strength)),
            ),
            Trend::Bearish => ballot.cast(
                "trend",
                VoteDirection::Sell,
                format!("{} bearish trend", capitalize(trend.strength)),
            ),
            Trend::Neutral => ballot.abstain("trend"),
        }

        // ── 5. EMA crossover (optional) ──────────────────────────────────
        if self.params.include_ema_cross {
            if let (Some(fast), Some(slow)) = (indicators.ema_12, indicators.ema_26) {
                let diff = fast - slow;
                if diff > tolerance {
                    ballot.cast(
                        "ema_cross",
                        VoteDirection::Buy,
                        "Short-term EMA above long-term EMA - bullish signal".to_string(),
                    );
                } else if diff < -tolerance {
                    ballot.cast(
                        "ema_cross",
                        VoteDirection::Sell,
                        "Short-term EMA below long-term EMA - bearish signal".to_string(),
                    );
                } else {
                    ballot.abstain("ema_cross");
                }
            }
        }

        let (buys, sells, neutrals) = ballot.tally();
        let margin = self.params.vote_margin as usize;

        let recommendation = if buys >= sells + margin {
            Recommendation::Buy
        } else if sells >= buys + margin {
            Recommendation::Sell
        } else {
            Recommendation::Hold
        };

        let confidence = self.confidence(recommendation, buys, sells, neutrals, trend, quality);

        debug!(
            %recommendation,
            buys,
            sells,
            neutrals,
            confidence = format!("{:.2}", confidence),
            "signals synthesized"
        );

        SignalResult {
            trend: trend.trend,
            strength: trend.strength,
            recommendation,
            confidence,
            key_levels: KeyLevels {
                support: indicators.support_resistance.map(|sr| sr.support),
                resistance: indicators.support_resistance.map(|sr| sr.resistance),
                sma_20: indicators.sma_20,
                sma_50: indicators.sma_50,
            },
            signals: ballot.messages,
            votes: ballot.votes,
        }
    }

    fn confidence(
        &self,
        recommendation: Recommendation,
        buys: usize,
        sells: usize,
        neutrals: usize,
        trend: &TrendAnalysis,
        quality: AnalysisQuality,
    ) -> f64 {
        let voters = buys + sells + neutrals;
        if voters == 0 {
            return 0.0;
        }

        let agreeing = match recommendation {
            Recommendation::Buy => buys,
            Recommendation::Sell => sells,
            Recommendation::Hold => neutrals,
        };
        let agreement = agreeing as f64 / voters as f64 * 100.0;
        let trend_weight = 0.5 + 0.5 * (trend.confidence.clamp(0.0, 100.0) / 100.0);

        let cap = match quality {
            AnalysisQuality::High => 100.0,
            AnalysisQuality::Medium => self.params.medium_quality_cap,
            AnalysisQuality::Low => self.params.low_quality_cap,
        };

        let confidence = (agreement * trend_weight).min(cap);
        if confidence.is_finite() {
            confidence.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

impl Default for SignalSynthesizer {
    fn default() -> Self {
        Self::new(SignalParams::default())
    }
}

/// Votes and messages accumulated in evaluation order.
#[derive(Default)]
struct Ballot {
    votes: Vec<IndicatorVote>,
    messages: Vec<String>,
}

impl Ballot {
    fn cast(&mut self, indicator: &str, vote: VoteDirection, message: String) {
        self.votes.push(IndicatorVote {
            indicator: indicator.to_string(),
            vote,
        });
        self.messages.push(message);
    }

    fn abstain(&mut self, indicator: &str) {
        self.votes.push(IndicatorVote {
            indicator: indicator.to_string(),
            vote: VoteDirection::Neutral,
        });
    }

    fn tally(&self) -> (usize, usize, usize) {
        self.votes
            .iter()
            .fold((0, 0, 0), |(b, s, n), v| match v.vote {
                VoteDirection::Buy => (b + 1, s, n),
                VoteDirection::Sell => (b, s + 1, n),
                VoteDirection::Neutral => (b, s, n + 1),
            })
    }
}

fn capitalize(strength: Strength) -> &'static str {
    match strength {
        Strength::Weak => "Weak",
        Strength::Moderate => "Moderate",
        Strength::Strong => "Strong",
    }
}
