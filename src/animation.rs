//! 动画时间线：弹簧值与带延迟的定时值，均支持飞行中改目标（retarget）
//!
//! 快速连点时不排队：每个动画值永远从当前实时值朝最新目标走。

/// 缓动函数（定时动画用）
#[derive(Clone, Copy, Debug, Default)]
pub enum Easing {
    Linear,
    /// 二次缓入缓出
    #[default]
    EaseInOutQuad,
}

impl Easing {
    /// 把线性进度 0..=1 映射为缓动进度
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// 弹簧参数。默认值取自常见移动端动画库的 withSpring 缺省，
/// 手感接近原型：刚度 100、阻尼 10、质量 1。
#[derive(Clone, Copy, Debug)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// 位移小于该值视为到位
    pub rest_delta: f32,
    /// 速度小于该值（单位/秒）视为停止
    pub rest_speed: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            rest_delta: 0.01,
            rest_speed: 2.0,
        }
    }
}

/// 阻尼弹簧驱动的连续值。无固定时长，位移与速度都进入容差后收敛到目标。
/// `set_target` 保留当前值与速度，飞行中改目标不会跳变。
pub struct Spring {
    value: f32,
    velocity: f32,
    target: f32,
    config: SpringConfig,
    settled: bool,
}

impl Spring {
    pub fn new(value: f32, config: SpringConfig) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            config,
            settled: true,
        }
    }

    /// 改目标：从当前实时值、当前速度继续朝新目标运动
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        self.settled = (self.value - target).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed;
        if self.settled {
            self.value = target;
            self.velocity = 0.0;
        }
    }

    /// 推进 dt 秒。RK4 积分，大步长拆分为 ≤4ms 子步保证稳定
    pub fn tick(&mut self, dt: f32) {
        if self.settled || dt <= 0.0 {
            return;
        }
        let mut remaining = dt.min(0.25);
        while remaining > 0.0 {
            let h = remaining.min(0.004);
            self.rk4_step(h);
            remaining -= h;
        }
        if (self.value - self.target).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed
        {
            // 进入容差即吸附到目标，避免尾部无限抖动
            self.value = self.target;
            self.velocity = 0.0;
            self.settled = true;
        }
    }

    fn accel(&self, x: f32, v: f32) -> f32 {
        (-self.config.stiffness * (x - self.target) - self.config.damping * v) / self.config.mass
    }

    fn rk4_step(&mut self, h: f32) {
        let (x, v) = (self.value, self.velocity);

        let k1x = v;
        let k1v = self.accel(x, v);
        let k2x = v + 0.5 * h * k1v;
        let k2v = self.accel(x + 0.5 * h * k1x, v + 0.5 * h * k1v);
        let k3x = v + 0.5 * h * k2v;
        let k3v = self.accel(x + 0.5 * h * k2x, v + 0.5 * h * k2v);
        let k4x = v + h * k3v;
        let k4v = self.accel(x + h * k3x, v + h * k3v);

        self.value = x + h / 6.0 * (k1x + 2.0 * k2x + 2.0 * k3x + k4x);
        self.velocity = v + h / 6.0 * (k1v + 2.0 * k2v + 2.0 * k3v + k4v);
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }
}

/// 固定时长 + 起始延迟的定时动画值。延迟期内保持改目标那一刻的值不动，
/// 到点后按缓动在 duration 内走完。`set_target` 从当前实时值重新计时。
pub struct DelayedTiming {
    value: f32,
    from: f32,
    target: f32,
    /// 起始延迟（秒）
    delay: f32,
    /// 动画时长（秒）
    duration: f32,
    elapsed: f32,
    easing: Easing,
    running: bool,
}

impl DelayedTiming {
    pub fn new(value: f32, delay_ms: f64, duration_ms: f64) -> Self {
        Self {
            value,
            from: value,
            target: value,
            delay: (delay_ms / 1000.0) as f32,
            duration: (duration_ms / 1000.0) as f32,
            elapsed: 0.0,
            easing: Easing::default(),
            running: false,
        }
    }

    /// 改目标：延迟从头计，起点取当前实时值（不排队、不跳变）
    pub fn set_target(&mut self, target: f32) {
        self.from = self.value;
        self.target = target;
        self.elapsed = 0.0;
        self.running = (target - self.value).abs() > f32::EPSILON;
        if !self.running {
            self.value = target;
        }
    }

    /// 推进 dt 秒
    pub fn tick(&mut self, dt: f32) {
        if !self.running || dt <= 0.0 {
            return;
        }
        self.elapsed += dt;
        if self.elapsed <= self.delay {
            return;
        }
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            ((self.elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
        };
        self.value = self.from + (self.target - self.from) * self.easing.apply(t);
        if t >= 1.0 {
            self.value = self.target;
            self.running = false;
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_settled(&self) -> bool {
        !self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 以 120fps 步进直到弹簧收敛，返回步数
    fn run_until_settled(s: &mut Spring) -> u32 {
        let mut steps = 0;
        while !s.is_settled() {
            s.tick(1.0 / 120.0);
            steps += 1;
            assert!(steps < 100_000, "spring never settled");
        }
        steps
    }

    #[test]
    fn easing_endpoints_exact() {
        for e in [Easing::Linear, Easing::EaseInOutQuad] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_eq!(e.apply(1.0), 1.0);
        }
        // 中点对称
        assert!((Easing::EaseInOutQuad.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn spring_converges_to_target() {
        let mut s = Spring::new(0.0, SpringConfig::default());
        s.set_target(1.0);
        run_until_settled(&mut s);
        assert_eq!(s.value(), 1.0);
    }

    #[test]
    fn spring_retarget_midflight_matches_parity() {
        // 连点三次（奇数）：飞行中两次改目标，最终仍应停在 1
        let mut s = Spring::new(0.0, SpringConfig::default());
        s.set_target(1.0);
        for _ in 0..10 {
            s.tick(1.0 / 120.0);
        }
        s.set_target(0.0);
        for _ in 0..7 {
            s.tick(1.0 / 120.0);
        }
        s.set_target(1.0);
        run_until_settled(&mut s);
        assert_eq!(s.value(), 1.0);

        // 再点一次（偶数）→ 回到 0
        s.set_target(0.0);
        run_until_settled(&mut s);
        assert_eq!(s.value(), 0.0);
    }

    #[test]
    fn spring_rotation_never_accumulates() {
        // 亮→暗→亮：目标是绝对的 0/360，最终回到 0 而不是 720
        let mut s = Spring::new(0.0, SpringConfig::default());
        s.set_target(360.0);
        run_until_settled(&mut s);
        assert_eq!(s.value(), 360.0);
        s.set_target(0.0);
        run_until_settled(&mut s);
        assert_eq!(s.value(), 0.0);
    }

    #[test]
    fn spring_same_config_same_trajectory_shape() {
        // 形变与旋转用同一组参数：归一化后的轨迹应一致（视觉同步）
        let mut a = Spring::new(0.0, SpringConfig::default());
        let mut b = Spring::new(0.0, SpringConfig::default());
        a.set_target(1.0);
        b.set_target(360.0);
        for _ in 0..60 {
            a.tick(1.0 / 120.0);
            b.tick(1.0 / 120.0);
            assert!((a.value() - b.value() / 360.0).abs() < 1e-3);
        }
    }

    #[test]
    fn timing_holds_until_delay_elapses() {
        let mut rays: Vec<DelayedTiming> =
            (0..8).map(|i| DelayedTiming::new(1.0, i as f64 * 50.0, 20.0)).collect();
        for r in &mut rays {
            r.set_target(0.0);
        }
        // 推进 120ms：index*50ms 未到的光线必须原地不动
        let mut elapsed = 0.0f32;
        let step = 0.004f32;
        let mut first_moved_at = [f32::MAX; 8];
        while elapsed < 0.5 {
            elapsed += step;
            for (i, r) in rays.iter_mut().enumerate() {
                r.tick(step);
                if r.value() < 1.0 && first_moved_at[i] == f32::MAX {
                    first_moved_at[i] = elapsed;
                }
            }
        }
        for (i, &t) in first_moved_at.iter().enumerate() {
            // 不早于 i*50ms 启动
            assert!(t >= i as f32 * 0.05, "ray {i} moved at {t}");
        }
        // 0 号严格早于 7 号，顺序稳定
        assert!(first_moved_at[0] < first_moved_at[7]);
        for r in &rays {
            assert!(r.is_settled());
            assert_eq!(r.value(), 0.0);
        }
    }

    #[test]
    fn timing_retarget_restarts_from_live_value() {
        let mut t = DelayedTiming::new(1.0, 0.0, 20.0);
        t.set_target(0.0);
        t.tick(0.010); // 走到一半附近
        let mid = t.value();
        assert!(mid > 0.0 && mid < 1.0);
        t.set_target(1.0); // 飞行中折返
        assert_eq!(t.value(), mid); // 不跳变
        t.tick(0.040);
        assert!(t.is_settled());
        assert_eq!(t.value(), 1.0);
    }

    #[test]
    fn timing_noop_target_stays_settled() {
        let mut t = DelayedTiming::new(1.0, 100.0, 20.0);
        t.set_target(1.0);
        assert!(t.is_settled());
        t.tick(1.0);
        assert_eq!(t.value(), 1.0);
    }
}
